//! Remote API transport layer
//!
//! The authority for all circulation state is the remote LMS server; this
//! layer issues the HTTPS JSON calls and maps failures into [`AppError`].

pub mod borrows;
pub mod libraries;
pub mod policies;
pub mod reservations;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{ApiConfig, AuthConfig},
    error::{AppError, AppResult},
};

/// Error body shape returned by the remote API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Shared HTTP client with base URL and bearer-token authorization.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(api: &ApiConfig, auth: &AuthConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .user_agent(api.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: auth.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn error_from(response: Response) -> AppError {
        let status = response.status();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        tracing::warn!(%status, %message, "remote API call failed");
        AppError::Api { status, message }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn send_no_content(&self, builder: RequestBuilder) -> AppResult<()> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    /// GET where a 404 means "does not exist yet" rather than a failure.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let response = self.request(Method::GET, path).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(Some(response.json().await?))
    }

    /// POST a JSON body. State-changing calls carry an `Idempotency-Key`
    /// header; the server deduplicates requests that share a key.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> AppResult<T> {
        let mut builder = self.request(Method::POST, path).json(body);
        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key.to_string());
        }
        self.send(builder).await
    }

    /// POST without a body (transition endpoints such as `/return`).
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        idempotency_key: Option<Uuid>,
    ) -> AppResult<T> {
        let mut builder = self.request(Method::POST, path);
        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key.to_string());
        }
        self.send(builder).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        self.send_no_content(self.request(Method::DELETE, path)).await
    }
}

/// Aggregate of the per-resource API ports.
///
/// Constructed from one shared [`HttpClient`]; tests substitute mocks for
/// individual ports.
#[derive(Clone)]
pub struct RemoteApi {
    pub borrows: Arc<dyn borrows::BorrowsApi>,
    pub reservations: Arc<dyn reservations::ReservationsApi>,
    pub policies: Arc<dyn policies::PoliciesApi>,
    pub libraries: Arc<dyn libraries::LibrariesApi>,
}

impl RemoteApi {
    /// Create the full set of API clients backed by the remote server
    pub fn new(http: HttpClient) -> Self {
        Self {
            borrows: Arc::new(borrows::BorrowsClient::new(http.clone())),
            reservations: Arc::new(reservations::ReservationsClient::new(http.clone())),
            policies: Arc::new(policies::PoliciesClient::new(http.clone())),
            libraries: Arc::new(libraries::LibrariesClient::new(http)),
        }
    }
}
