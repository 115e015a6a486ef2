use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::FormError;
use crate::entities::{LoginCredentials, Registration, SessionUser};
use crate::services::auth::{AuthService, AuthServiceError};
use crate::session::{Screen, SessionGate};
use tensio_track_data::repository::AuthGatewayTrait;

/// Message shown when a failure carries no explanation
pub const GENERIC_FAILURE: &str = "Une erreur est survenue";

/// Whether the form signs in or creates an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Connexion",
            AuthMode::Register => "Inscription",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Se connecter",
            AuthMode::Register => "S'inscrire",
        }
    }
}

/// Fields of the auth form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    FirstName,
    LastName,
    DateOfBirth,
}

/// Payload built from the form, ready for the auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSubmission {
    Login(LoginCredentials),
    Register(Registration),
}

/// Raw text of the auth form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthFields {
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`, optional
    pub date_of_birth: String,
}

/// Login and registration form
#[derive(Debug, Clone, Serialize)]
pub struct AuthFormController {
    mode: AuthMode,
    fields: AuthFields,
    error: Option<String>,
    busy: bool,
}

impl Default for AuthFormController {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFormController {
    /// Empty form in login mode
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            fields: AuthFields::default(),
            error: None,
            busy: false,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn fields(&self) -> &AuthFields {
        &self.fields
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Label of the submit button, "Chargement..." while busy
    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            "Chargement..."
        } else {
            self.mode.submit_label()
        }
    }

    /// Switch between login and registration, clearing fields and error
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.fields = AuthFields::default();
        self.error = None;
    }

    pub fn set(&mut self, field: AuthField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AuthField::Email => self.fields.email = value,
            AuthField::Password => self.fields.password = value,
            AuthField::FirstName => self.fields.first_name = value,
            AuthField::LastName => self.fields.last_name = value,
            AuthField::DateOfBirth => self.fields.date_of_birth = value,
        }
    }

    /// Mark the form busy and build the payload for the current mode
    pub fn begin_submit(&mut self) -> Result<AuthSubmission, FormError> {
        if self.busy {
            return Err(FormError::Busy);
        }
        self.error = None;

        let submission = match self.mode {
            AuthMode::Login => AuthSubmission::Login(LoginCredentials {
                email: self.fields.email.trim().to_string(),
                password: self.fields.password.clone(),
            }),
            AuthMode::Register => {
                let raw = self.fields.date_of_birth.trim();
                let date_of_birth = if raw.is_empty() {
                    None
                } else {
                    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                        Ok(day) => Some(day),
                        Err(_) => {
                            let message = "Date de naissance invalide (AAAA-MM-JJ)".to_string();
                            self.error = Some(message.clone());
                            return Err(FormError::Failed(message));
                        }
                    }
                };
                AuthSubmission::Register(Registration {
                    email: self.fields.email.trim().to_string(),
                    password: self.fields.password.clone(),
                    first_name: self.fields.first_name.trim().to_string(),
                    last_name: self.fields.last_name.trim().to_string(),
                    date_of_birth,
                })
            }
        };

        self.busy = true;
        Ok(submission)
    }

    /// Record the outcome of a submission and clear the busy flag
    pub fn finish_submit(
        &mut self,
        result: Result<SessionUser, AuthServiceError>,
    ) -> Result<SessionUser, FormError> {
        self.busy = false;
        match result {
            Ok(user) => {
                self.fields = AuthFields::default();
                Ok(user)
            }
            Err(err) => {
                debug!("Auth form submission failed: {}", err);
                let message = match err {
                    AuthServiceError::Validation(msg) => msg,
                    AuthServiceError::Rejected(Some(msg)) if !msg.is_empty() => msg,
                    _ => GENERIC_FAILURE.to_string(),
                };
                self.error = Some(message.clone());
                Err(FormError::Failed(message))
            }
        }
    }

    /// Submit through the auth service and open the session on success
    pub async fn submit<G: AuthGatewayTrait>(
        &mut self,
        service: &AuthService<G>,
        gate: &mut SessionGate,
    ) -> Result<SessionUser, FormError> {
        if !gate.can_reach(Screen::Auth) {
            return Err(FormError::Unreachable);
        }

        let result = match self.begin_submit()? {
            AuthSubmission::Login(credentials) => service.login(credentials).await,
            AuthSubmission::Register(registration) => service.register(registration).await,
        };
        let user = self.finish_submit(result)?;

        gate.sign_in(user.clone()).map_err(|_| FormError::Unreachable)?;
        Ok(user)
    }
}
