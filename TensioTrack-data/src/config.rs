//! API configuration for the TensioTrack client
//!
//! Values are read from environment variables (a `.env` file is loaded by the
//! binary before this runs):
//! - `TENSIO_API_URL`: base URL of the API
//! - `TENSIO_API_TIMEOUT_SECS`: optional request timeout, transport default when unset
//! - `TENSIO_API_TOKEN`: optional bearer token from an earlier session

use std::env;
use thiserror::Error;
use tracing::{info, warn};

/// Base URL used when `TENSIO_API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://tensio-track-backend.vercel.app";

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// The base URL is not an http(s) URL
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
    /// Bearer token restored from the environment
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: None,
            token: None,
        }
    }
}

impl ApiConfig {
    /// Create a new API configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("TENSIO_API_URL") {
            Some(url) => normalize_base_url(&url)?,
            None => {
                info!("TENSIO_API_URL not set, using default: {}", DEFAULT_API_URL);
                DEFAULT_API_URL.to_string()
            }
        };

        let timeout_seconds = match lookup("TENSIO_API_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                warn!("Invalid TENSIO_API_TIMEOUT_SECS value: {}", raw);
                ConfigError::InvalidValue {
                    key: "TENSIO_API_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        let token = lookup("TENSIO_API_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        info!(
            "API configuration: base_url={}, timeout={:?}s, token={}",
            base_url,
            timeout_seconds,
            if token.is_some() { "provided" } else { "none" }
        );

        Ok(Self {
            base_url,
            timeout_seconds,
            token,
        })
    }

    /// Override the base URL
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(url)?;
        Ok(self)
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        if timeout_seconds.is_some() {
            self.timeout_seconds = timeout_seconds;
        }
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
