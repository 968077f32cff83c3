//! Thin data-access layer over the employee REST backend.
//!
//! Five calls against `{api_url}/Employees`, no retries, no timeout policy and
//! no transformation beyond JSON decoding.

use std::{error::Error as StdError, future::Future};

use entity::{Employee, EmployeeId, NewEmployee};
use reqwest::{Client, Response, Url};
pub use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Resource collection appended to the configured API base URL.
pub const COLLECTION: &str = "Employees";

/// Shared client result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend unreachable at {url}")]
    Unavailable {
        url: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("request failed with status {status}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn unavailable(
        url: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Unavailable {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unavailable { .. } => "UNAVAILABLE",
            ApiError::Status { .. } => "STATUS",
            ApiError::Decode(_) => "DECODE",
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::InvalidBaseUrl(_) => "INVALID_BASE_URL",
        }
    }

    /// Connection-level failure: nothing answered at the configured address.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Unavailable { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            let url = err.url().map(Url::to_string).unwrap_or_default();
            ApiError::unavailable(url, err)
        } else if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Transport(err)
        }
    }
}

/// The five backend operations the controller depends on.
pub trait EmployeeApi: Send + Sync {
    fn list(&self) -> impl Future<Output = ApiResult<Vec<Employee>>> + Send;

    fn get(&self, id: EmployeeId) -> impl Future<Output = ApiResult<Employee>> + Send;

    fn create(&self, employee: &NewEmployee) -> impl Future<Output = ApiResult<()>> + Send;

    fn update(
        &self,
        id: EmployeeId,
        employee: &Employee,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    fn delete(&self, id: EmployeeId) -> impl Future<Output = ApiResult<()>> + Send;
}

#[derive(Clone, Debug)]
pub struct EmployeeClient {
    http: Client,
    collection: Url,
}

impl EmployeeClient {
    pub fn new(api_url: &str) -> ApiResult<Self> {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(http: Client, api_url: &str) -> ApiResult<Self> {
        let base = api_url.trim().trim_end_matches('/');
        let collection = Url::parse(&format!("{base}/{COLLECTION}"))
            .map_err(|_| ApiError::InvalidBaseUrl(api_url.to_string()))?;
        if collection.cannot_be_a_base() || !matches!(collection.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(api_url.to_string()));
        }
        Ok(Self { http, collection })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn member_url(&self, id: EmployeeId) -> String {
        format!("{}/{}", self.collection, id)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        builder: reqwest::RequestBuilder,
        body: &B,
    ) -> ApiResult<Response> {
        let response = builder.json(body).send().await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

impl EmployeeApi for EmployeeClient {
    async fn list(&self) -> ApiResult<Vec<Employee>> {
        debug!(url = %self.collection, "GET employees");
        let response = self.http.get(self.collection.clone()).send().await?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    async fn get(&self, id: EmployeeId) -> ApiResult<Employee> {
        let url = self.member_url(id);
        debug!(%url, "GET employee");
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    async fn create(&self, employee: &NewEmployee) -> ApiResult<()> {
        debug!(url = %self.collection, "POST employee");
        self.send_json(self.http.post(self.collection.clone()), employee)
            .await?;
        Ok(())
    }

    async fn update(&self, id: EmployeeId, employee: &Employee) -> ApiResult<()> {
        let url = self.member_url(id);
        debug!(%url, "PUT employee");
        self.send_json(self.http.put(url), employee).await?;
        Ok(())
    }

    async fn delete(&self, id: EmployeeId) -> ApiResult<()> {
        let url = self.member_url(id);
        debug!(%url, "DELETE employee");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
