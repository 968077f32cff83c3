use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

/// Configuration for tracing initialization.
///
/// Events always go to stderr; the console front-end owns stdout.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    /// Filter used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_filter: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub with_target: bool,
}

impl ObsConfig {
    /// Quiet defaults for the interactive console: warnings only unless asked.
    pub fn console() -> Self {
        Self {
            service_name: "hr-console",
            default_filter: "warn",
            env_filter: None,
            otlp_endpoint: None,
            with_target: false,
        }
    }

    pub fn backend() -> Self {
        Self {
            service_name: "hr-backend",
            default_filter: "info,tower_http=info",
            env_filter: None,
            otlp_endpoint: std::env::var("OTLP_ENDPOINT").ok(),
            with_target: true,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose && self.env_filter.is_none() {
            self.env_filter = Some("debug".into());
        }
        self
    }

    fn resolved_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.default_filter.to_string())
    }
}

/// Install the stderr subscriber, plus an OTLP exporter when an endpoint is set.
/// Calling it again is a no-op.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(config.resolved_filter())?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target);
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Some(endpoint) = config.otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(endpoint)
            .build()?;

        let resource = Resource::builder()
            .with_service_name(config.service_name)
            .build();

        let provider = sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build();
        let tracer = provider.tracer(config.service_name);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()?;
    } else {
        registry.try_init()?;
    }

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}
