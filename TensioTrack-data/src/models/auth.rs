use serde::{Deserialize, Serialize};

/// User as returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Body sent to the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Body sent to the registration endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`, omitted when not provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Response of the login and registration endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Explicit success flag, when the server sends one
    #[serde(default)]
    pub success: Option<bool>,

    /// Error message on failure
    #[serde(default)]
    pub error: Option<String>,

    /// Alternative message field
    #[serde(default)]
    pub message: Option<String>,

    /// Bearer token for subsequent requests
    #[serde(default)]
    pub token: Option<String>,

    /// The signed in user
    #[serde(default)]
    pub user: Option<UserRecord>,
}

impl AuthResponse {
    /// Whether the call signed the user in
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(self.user.is_some()) && self.user.is_some()
    }

    /// Failure message provided by the server, if any
    pub fn failure_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// Response of the current-user endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    #[serde(default)]
    pub user: Option<UserRecord>,
}
