// Domain services
// Pure computations over measurements, plus the services wrapping the data layer.
pub mod auth;
pub mod chart;
pub mod classifier;
pub mod measurement;
pub mod statistics;

// Re-export service traits and factory functions
pub use auth::{create_remote_auth_service, AuthService, AuthServiceError};
pub use chart::build_series;
pub use classifier::classify;
pub use measurement::{
    create_remote_measurement_service, MeasurementService, MeasurementServiceError,
    MeasurementServiceTrait,
};
pub use statistics::aggregate;
