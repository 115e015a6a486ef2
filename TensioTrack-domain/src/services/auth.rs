use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

use crate::entities::conversions::convert_to_domain_user;
use crate::entities::{LoginCredentials, Registration, SessionUser};
use crate::logging::{log_failed_login, log_logout, log_registration, log_session_restored, log_successful_login};
use tensio_track_data::models::auth::{AuthResponse, LoginPayload, RegisterPayload};
use tensio_track_data::repository::{AuthGatewayTrait, HttpAuthGateway, RepositoryError};
use tensio_track_data::ApiClient;

/// Authentication service errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthServiceError {
    /// Form values rejected before submission
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server refused the credentials or the registration
    #[error("Rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected server failure
    #[error("Server error: {0}")]
    Server(String),
}

impl From<RepositoryError> for AuthServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Network(msg) => AuthServiceError::Network(msg),
            RepositoryError::Validation(msg) => AuthServiceError::Rejected(Some(msg)),
            other => AuthServiceError::Server(other.to_string()),
        }
    }
}

/// Flatten validator errors into one message, fields in a stable order
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("Champ invalide : {}", field),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Authentication service on top of the auth gateway
pub struct AuthService<G: AuthGatewayTrait> {
    gateway: G,
}

impl<G: AuthGatewayTrait> AuthService<G> {
    /// Create a new authentication service
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Look up the user of an already established session
    pub async fn restore(&self) -> Result<Option<SessionUser>, AuthServiceError> {
        let user = self.gateway.current_user().await?.map(convert_to_domain_user);
        if let Some(user) = &user {
            log_session_restored(&user.email);
        }
        Ok(user)
    }

    /// Sign in with email and password
    pub async fn login(&self, credentials: LoginCredentials) -> Result<SessionUser, AuthServiceError> {
        credentials
            .validate()
            .map_err(|e| AuthServiceError::Validation(describe(&e)))?;

        let started = Instant::now();
        let email = credentials.email.clone();
        let response = self
            .gateway
            .login(LoginPayload {
                email: credentials.email,
                password: credentials.password,
            })
            .await
            .map_err(|e| {
                log_failed_login(&email, &e.to_string());
                AuthServiceError::from(e)
            })?;

        match Self::signed_in_user(response) {
            Ok(user) => {
                log_successful_login(&user.email, started.elapsed().as_millis() as u64);
                Ok(user)
            }
            Err(err) => {
                log_failed_login(&email, &err.to_string());
                Err(err)
            }
        }
    }

    /// Create an account and sign in
    pub async fn register(&self, registration: Registration) -> Result<SessionUser, AuthServiceError> {
        registration
            .validate()
            .map_err(|e| AuthServiceError::Validation(describe(&e)))?;

        let email = registration.email.clone();
        let response = self
            .gateway
            .register(RegisterPayload {
                email: registration.email,
                password: registration.password,
                first_name: registration.first_name,
                last_name: registration.last_name,
                date_of_birth: registration
                    .date_of_birth
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            })
            .await?;

        let result = Self::signed_in_user(response);
        match &result {
            Ok(_) => log_registration(&email, true, None),
            Err(err) => log_registration(&email, false, Some(&err.to_string())),
        }
        result
    }

    /// End the remote session; local teardown is the caller's job
    pub async fn logout(&self, user: &SessionUser) -> Result<(), AuthServiceError> {
        let result = self.gateway.logout().await.map_err(AuthServiceError::from);
        if let Err(e) = &result {
            warn!("Logout for {} did not reach the server: {}", user.email, e);
        }
        log_logout(&user.email);
        result
    }

    fn signed_in_user(response: AuthResponse) -> Result<SessionUser, AuthServiceError> {
        if response.is_success() {
            if let Some(user) = response.user {
                debug!("Signed in as {}", user.email);
                return Ok(convert_to_domain_user(user));
            }
        }
        Err(AuthServiceError::Rejected(
            response.failure_message().map(String::from),
        ))
    }
}

/// Create an authentication service talking to the remote API
pub fn create_remote_auth_service(client: ApiClient) -> AuthService<HttpAuthGateway> {
    AuthService::new(HttpAuthGateway::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::always;
    use tensio_track_data::models::auth::UserRecord;

    mock! {
        pub Gateway {}

        #[async_trait]
        impl AuthGatewayTrait for Gateway {
            async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, RepositoryError>;
            async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, RepositoryError>;
            async fn logout(&self) -> Result<(), RepositoryError>;
            async fn current_user(&self) -> Result<Option<UserRecord>, RepositoryError>;
        }
    }

    fn ana() -> UserRecord {
        UserRecord {
            first_name: "Ana".to_string(),
            last_name: "Roy".to_string(),
            email: "ana@example.org".to_string(),
            date_of_birth: Some("1985-04-12".to_string()),
        }
    }

    fn credentials(password: &str) -> LoginCredentials {
        LoginCredentials {
            email: "ana@example.org".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_login()
            .withf(|payload| payload.email == "ana@example.org" && payload.password == "secret1")
            .times(1)
            .returning(|_| {
                Ok(AuthResponse {
                    success: Some(true),
                    user: Some(ana()),
                    ..AuthResponse::default()
                })
            });

        let service = AuthService::new(gateway);
        let user = service.login(credentials("secret1")).await.unwrap();
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.date_of_birth, chrono::NaiveDate::from_ymd_opt(1985, 4, 12));
    }

    #[tokio::test]
    async fn test_login_rejected_carries_server_error() {
        let mut gateway = MockGateway::new();
        gateway.expect_login().with(always()).returning(|_| {
            Ok(AuthResponse {
                success: Some(false),
                error: Some("Identifiants invalides".to_string()),
                ..AuthResponse::default()
            })
        });

        let service = AuthService::new(gateway);
        let err = service.login(credentials("secret1")).await.unwrap_err();
        assert_eq!(err, AuthServiceError::Rejected(Some("Identifiants invalides".to_string())));
    }

    #[tokio::test]
    async fn test_short_password_is_not_sent() {
        let mut gateway = MockGateway::new();
        gateway.expect_login().never();

        let service = AuthService::new(gateway);
        let err = service.login(credentials("123")).await.unwrap_err();
        match err {
            AuthServiceError::Validation(msg) => assert!(msg.contains("6 caractères")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_email_is_not_sent() {
        let mut gateway = MockGateway::new();
        gateway.expect_login().never();
        gateway.expect_register().never();

        let service = AuthService::new(gateway);
        let err = service
            .login(LoginCredentials {
                email: "ana.example.org".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthServiceError::Validation("Adresse email invalide".to_string()));

        let err = service
            .register(Registration {
                email: "ana@".to_string(),
                password: "secret1".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Roy".to_string(),
                date_of_birth: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthServiceError::Validation("Adresse email invalide".to_string()));
    }

    #[tokio::test]
    async fn test_register_requires_names() {
        let mut gateway = MockGateway::new();
        gateway.expect_register().never();

        let service = AuthService::new(gateway);
        let err = service
            .register(Registration {
                email: "new@example.org".to_string(),
                password: "secret1".to_string(),
                first_name: String::new(),
                last_name: "Roy".to_string(),
                date_of_birth: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthServiceError::Validation("Le prénom est requis".to_string()));
    }

    #[tokio::test]
    async fn test_register_sends_iso_birth_date() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_register()
            .withf(|payload| payload.date_of_birth.as_deref() == Some("1990-01-02"))
            .returning(|_| {
                Ok(AuthResponse {
                    user: Some(ana()),
                    ..AuthResponse::default()
                })
            });

        let service = AuthService::new(gateway);
        let result = service
            .register(Registration {
                email: "ana@example.org".to_string(),
                password: "secret1".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Roy".to_string(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 2),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_network_failure() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_login()
            .returning(|_| Err(RepositoryError::Network("refused".to_string())));

        let service = AuthService::new(gateway);
        let err = service.login(credentials("secret1")).await.unwrap_err();
        assert_eq!(err, AuthServiceError::Network("refused".to_string()));
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let mut gateway = MockGateway::new();
        gateway.expect_current_user().returning(|| Ok(None));

        let service = AuthService::new(gateway);
        assert_eq!(service.restore().await.unwrap(), None);
    }
}
