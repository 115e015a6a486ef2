use std::sync::PoisonError;
use thiserror::Error;

/// Error type for repository and gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The server rejected the submitted data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport failure, no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Lock error in the in-memory implementations
    #[error("Lock error: {0}")]
    Lock(String),
}

impl RepositoryError {
    /// HTTP status of a server error
    pub fn status(&self) -> Option<u16> {
        match self {
            RepositoryError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Turn a 4xx server error into a validation error carrying the server message
    pub fn into_rejection(self) -> Self {
        match self {
            RepositoryError::Server { status, message } if (400..500).contains(&status) => {
                RepositoryError::Validation(message)
            }
            other => other,
        }
    }
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            RepositoryError::InvalidPayload(error.to_string())
        } else if let Some(status) = error.status() {
            RepositoryError::Server {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            RepositoryError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        RepositoryError::InvalidPayload(error.to_string())
    }
}
