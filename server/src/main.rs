use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use server::{AppState, EmployeeStore, ServeConfig, store::demo_employees};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hr-backend", version, about = "In-memory employee REST backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the employee API from process memory.
    Serve(ServeCommand),
    /// Print the demo records `serve --seed` starts with.
    #[command(name = "seed:print")]
    SeedPrint,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HR_BACKEND_HOST", default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, env = "HR_BACKEND_PORT", default_value_t = 5000)]
    port: u16,
    #[arg(long, help = "Start with a handful of demo employees")]
    seed: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::backend())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::SeedPrint => seed_print(),
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let store = if cmd.seed {
        EmployeeStore::seeded()
    } else {
        EmployeeStore::new()
    };
    info!(employees = store.len(), "store ready");
    server::serve((&cmd).into(), AppState { store }).await
}

fn seed_print() -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(&demo_employees()).context("failed to render seed data")?;
    println!("{rendered}");
    Ok(())
}
