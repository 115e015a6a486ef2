// Domain entities and value objects
pub mod category;
pub mod chart;
pub mod conversions;
pub mod date_range;
pub mod measurement;
pub mod session;
pub mod stats;

// Re-export common types for easier imports
pub use category::{BloodPressureCategory, Classification};
pub use chart::ChartPoint;
pub use date_range::DateRange;
pub use measurement::{Measurement, MeasurementDraft, MeasurementField, NewMeasurementInput};
pub use session::{LoginCredentials, Registration, SessionUser};
pub use stats::MeasurementStats;
