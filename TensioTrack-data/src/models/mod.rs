// Wire models exchanged with the TensioTrack API
pub mod auth;
pub mod measurement;

use serde::{Deserialize, Serialize};

/// Error body returned by the API on non-success responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Alternative field used by the auth endpoints
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The first message the server provided, if any
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}
