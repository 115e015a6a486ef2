//! HTTP transport for the TensioTrack API
//!
//! Wraps a `reqwest::Client` together with the base URL and the bearer token
//! handed out by the auth endpoints. Cloning is cheap and clones share the token.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::config::{ApiConfig, ConfigError};
use crate::models::ApiErrorBody;
use crate::repository::RepositoryError;

/// Shared HTTP client for the API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Build a client from the configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: Arc::new(RwLock::new(config.token.clone())),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Replace the bearer token
    pub fn set_token(&self, token: Option<String>) -> Result<(), RepositoryError> {
        let mut slot = self.token.write()?;
        *slot = token;
        Ok(())
    }

    /// Whether a bearer token is currently held
    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    /// Start a request, attaching the bearer token when one is held
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, RepositoryError> {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.token.read()?.as_deref() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send a request, surfacing only transport failures
    pub(crate) async fn send_raw(&self, builder: RequestBuilder) -> Result<Response, RepositoryError> {
        builder.send().await.map_err(|e| {
            warn!("Request failed before a response was received: {}", e);
            RepositoryError::Network(e.to_string())
        })
    }

    /// Send a request and turn non-success statuses into `RepositoryError::Server`
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, RepositoryError> {
        let response = self.send_raw(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::into_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });

        warn!(status = status.as_u16(), "API returned an error: {}", message);
        Err(RepositoryError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
