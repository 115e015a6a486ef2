use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use super::errors::RepositoryError;
use crate::client::ApiClient;
use crate::models::auth::{AuthResponse, CurrentUserResponse, LoginPayload, RegisterPayload, UserRecord};

/// Gateway trait for the remote authentication endpoints
#[async_trait]
pub trait AuthGatewayTrait: Send + Sync {
    /// Sign in with email and password
    async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, RepositoryError>;

    /// Create an account and sign in
    async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, RepositoryError>;

    /// End the remote session
    async fn logout(&self) -> Result<(), RepositoryError>;

    /// The user of the current session, if one exists
    async fn current_user(&self) -> Result<Option<UserRecord>, RepositoryError>;
}

/// Gateway backed by the remote REST API
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    /// Create a new gateway on top of a shared client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Post to an auth endpoint; failure bodies are returned as unsuccessful responses
    async fn submit<T: serde::Serialize + Send + Sync>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<AuthResponse, RepositoryError> {
        let request = self.client.request(Method::POST, path)?.json(payload);
        let response = self.client.send_raw(request).await?;
        let status = response.status();
        let body = response.text().await?;

        let mut parsed = match serde_json::from_str::<AuthResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(RepositoryError::InvalidPayload(e.to_string())),
            Err(_) => {
                return Err(RepositoryError::Server {
                    status: status.as_u16(),
                    message: body,
                })
            }
        };

        if !status.is_success() {
            debug!("{} answered {}", path, status);
            parsed.success = Some(false);
        }

        if parsed.is_success() {
            self.client.set_token(parsed.token.clone())?;
        }
        Ok(parsed)
    }
}

#[async_trait]
impl AuthGatewayTrait for HttpAuthGateway {
    async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, RepositoryError> {
        self.submit("/api/auth/login", &payload).await
    }

    async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, RepositoryError> {
        self.submit("/api/auth/register", &payload).await
    }

    async fn logout(&self) -> Result<(), RepositoryError> {
        let result = match self.client.request(Method::POST, "/api/auth/logout") {
            Ok(request) => self.client.send(request).await.map(|_| ()),
            Err(e) => Err(e),
        };
        // The local credential goes away even when the server call fails
        self.client.set_token(None)?;
        if let Err(e) = &result {
            warn!("Remote logout failed: {}", e);
        }
        result
    }

    async fn current_user(&self) -> Result<Option<UserRecord>, RepositoryError> {
        if !self.client.has_token() {
            debug!("No credential held, skipping session restore");
            return Ok(None);
        }

        let request = self.client.request(Method::GET, "/api/auth/me")?;
        let response = self.client.send_raw(request).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Stored credential was rejected");
                self.client.set_token(None)?;
                Ok(None)
            }
            status if status.is_success() => {
                let body: CurrentUserResponse = response.json().await?;
                Ok(body.user)
            }
            status => Err(RepositoryError::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unexpected response").to_string(),
            }),
        }
    }
}
