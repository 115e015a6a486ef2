// TensioTrack Data
// This crate handles access to the remote TensioTrack REST API

// API configuration loaded from the environment
pub mod config;

// HTTP transport shared by the repository and the auth gateway
pub mod client;

// Wire models exchanged with the API
pub mod models;

// Repository implementations for measurement and auth access
pub mod repository;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigError};
