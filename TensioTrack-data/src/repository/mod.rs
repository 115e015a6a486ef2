// Repository module structure
pub mod errors;
mod auth;
mod measurement;

#[cfg(any(test, feature = "mock"))]
mod in_memory;

// Re-export commonly used types
pub use auth::{AuthGatewayTrait, HttpAuthGateway};
pub use errors::RepositoryError;
pub use measurement::{HttpMeasurementRepository, MeasurementRepositoryTrait};

#[cfg(any(test, feature = "mock"))]
pub use in_memory::{InMemoryAuthGateway, InMemoryMeasurementRepository};
