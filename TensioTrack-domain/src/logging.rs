use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthEventType {
    /// Successful sign in
    Login,
    /// Sign out
    Logout,
    /// Account creation
    Registration,
    /// Failed sign in
    FailedLogin,
    /// Session found at start up
    SessionRestored,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::Logout => write!(f, "LOGOUT"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::SessionRestored => write!(f, "SESSION_RESTORED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize)]
pub struct AuthEvent {
    /// Type of authentication event
    pub event_type: AuthEventType,
    /// Email of the user (if known)
    pub email: Option<String>,
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether the event was successful
    pub success: bool,
    /// Additional details about the event
    pub details: Option<String>,
    /// Duration of the round trip in milliseconds (if measured)
    pub duration_ms: Option<u64>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, email: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            email: email.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            duration_ms: None,
        }
    }

    /// Set the details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: &AuthEvent) {
    let email = event.email.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");

    if event.success {
        info!(
            event_type = %event.event_type,
            email,
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [SUCCESS] {}",
            event.event_type,
            email,
            details
        );
    } else {
        warn!(
            event_type = %event.event_type,
            email,
            "AUTH-LOG [{}] [{}] [FAILURE] {}",
            event.event_type,
            email,
            details
        );
    }
}

/// Log a successful login
pub fn log_successful_login(email: &str, duration_ms: u64) {
    log_auth_event(&AuthEvent::new(AuthEventType::Login, Some(email), true).with_duration(duration_ms));
}

/// Log a failed login attempt
pub fn log_failed_login(email: &str, reason: &str) {
    log_auth_event(&AuthEvent::new(AuthEventType::FailedLogin, Some(email), false).with_details(reason));
}

/// Log an account creation attempt
pub fn log_registration(email: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(email), success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(&event);
}

/// Log a logout
pub fn log_logout(email: &str) {
    log_auth_event(&AuthEvent::new(AuthEventType::Logout, Some(email), true));
}

/// Log a session restored at start up
pub fn log_session_restored(email: &str) {
    log_auth_event(&AuthEvent::new(AuthEventType::SessionRestored, Some(email), true));
}
