use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{self, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use entity::{Employee, EmployeeId, FieldError, NewEmployee};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::store::EmployeeStore;

pub const EMPLOYEES_PATH: &str = "/api/Employees";

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub store: EmployeeStore,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    serve_listener(listener, state, shutdown_signal()).await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_listener(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, "employee backend listening");
    axum::serve(listener, build_router(state).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::any())
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(EMPLOYEES_PATH, get(list_handler).post(create_handler))
        .route(
            &format!("{EMPLOYEES_PATH}/{{id}}"),
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

async fn list_handler(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.store.list())
}

async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> HttpResult<Json<Employee>> {
    state
        .store
        .get(id)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(id))
}

async fn create_handler(
    State(state): State<AppState>,
    Json(draft): Json<NewEmployee>,
) -> HttpResult<(StatusCode, Json<Employee>)> {
    draft.validate().map_err(HttpError::invalid)?;
    let employee = state.store.insert(draft);
    info!(id = %employee.id, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(employee): Json<Employee>,
) -> HttpResult<Json<Employee>> {
    if employee.id != id {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            format!("path id {id} does not match body id {}", employee.id),
        ));
    }
    employee.draft().validate().map_err(HttpError::invalid)?;
    let updated = state
        .store
        .replace(employee)
        .ok_or_else(|| HttpError::not_found(id))?;
    info!(%id, "employee updated");
    Ok(Json(updated))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> HttpResult<StatusCode> {
    if !state.store.remove(id) {
        return Err(HttpError::not_found(id));
    }
    info!(%id, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        employees: state.store.len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    fn not_found(id: EmployeeId) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("employee {id} not found"))
    }

    fn invalid(errors: Vec<FieldError>) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            warn!(status = %self.status, message = %self.message, "request rejected");
        }
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn router_with(store: EmployeeStore) -> Router {
        build_router(AppState { store })
    }

    async fn send(
        router: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = http::Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn ada() -> Value {
        json!({"name": "Ada", "email": "ada@acme.test", "department": "R&D", "salary": 4200})
    }

    #[tokio::test]
    async fn create_assigns_id_and_lists_it() {
        let store = EmployeeStore::new();
        let (status, created) =
            send(router_with(store.clone()), Method::POST, EMPLOYEES_PATH, Some(ada())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], json!(1));

        let (status, list) = send(router_with(store), Method::GET, EMPLOYEES_PATH, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["email"], json!("ada@acme.test"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload() {
        let store = EmployeeStore::new();
        let bad = json!({"name": "", "email": "nope", "department": "Ops", "salary": 0});
        let (status, body) =
            send(router_with(store.clone()), Method::POST, EMPLOYEES_PATH, Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let expected = "name is required; email must be a valid email address; \
                        salary must be greater than zero";
        assert_eq!(body, json!(expected));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_checks_ids_and_existence() {
        let store = EmployeeStore::seeded();
        let router = router_with(store.clone());
        let mut body = serde_json::to_value(store.get(EmployeeId(1)).unwrap()).unwrap();
        body["department"] = json!("Research");

        let (status, _) =
            send(router.clone(), Method::PUT, "/api/Employees/2", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) =
            send(router.clone(), Method::PUT, "/api/Employees/1", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["department"], json!("Research"));

        body["id"] = json!(42);
        let (status, _) = send(router, Method::PUT, "/api/Employees/42", Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = EmployeeStore::seeded();
        let (status, _) =
            send(router_with(store.clone()), Method::DELETE, "/api/Employees/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) =
            send(router_with(store.clone()), Method::GET, "/api/Employees/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!("employee 1 not found"));

        let (status, _) = send(router_with(store), Method::DELETE, "/api/Employees/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_row_count() {
        let (status, body) =
            send(router_with(EmployeeStore::seeded()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["employees"], json!(4));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = router_with(EmployeeStore::new())
            .oneshot(
                http::Request::builder()
                    .uri(EMPLOYEES_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
