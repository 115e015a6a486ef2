// Testing utilities and mock implementations for the domain layer
// This module is only available in tests and when the "mock" feature is enabled

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::entities::{DateRange, Measurement, MeasurementDraft, NewMeasurementInput, SessionUser};
use crate::services::measurement::{coerce_input, MeasurementServiceError, MeasurementServiceTrait};
use tensio_track_data::models::auth::UserRecord;
use tensio_track_data::models::measurement::MeasurementRecord;

// Re-export the in-memory data layer doubles
pub use tensio_track_data::repository::{InMemoryAuthGateway, InMemoryMeasurementRepository};

/// Account used across tests
pub fn sample_user_record() -> UserRecord {
    UserRecord {
        first_name: "Ana".to_string(),
        last_name: "Roy".to_string(),
        email: "ana@example.org".to_string(),
        date_of_birth: Some("1985-04-12".to_string()),
    }
}

/// Session user matching `sample_user_record`
pub fn sample_user() -> SessionUser {
    SessionUser {
        first_name: "Ana".to_string(),
        last_name: "Roy".to_string(),
        email: "ana@example.org".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 4, 12),
    }
}

/// Measurement at `date` (`YYYY-MM-DD`) and `time` (`HH:MM`)
///
/// Panics on malformed fixtures.
pub fn sample_measurement(id: &str, date: &str, time: &str, systolic: i32, diastolic: i32) -> Measurement {
    Measurement {
        id: id.to_string(),
        systolic,
        diastolic,
        pulse: 70,
        measurement_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
        measurement_time: NaiveTime::parse_from_str(time, "%H:%M").expect("fixture time"),
        notes: None,
    }
}

/// Wire record for the in-memory repository
pub fn sample_record(id: &str, date: &str, time: &str, systolic: i32, diastolic: i32) -> MeasurementRecord {
    MeasurementRecord {
        id: id.to_string(),
        systolic,
        diastolic,
        pulse: 70,
        measurement_date: date.to_string(),
        measurement_time: time.to_string(),
        notes: None,
    }
}

/// Mock implementation of the MeasurementServiceTrait for testing
///
/// Failures can be switched on and off after construction.
pub struct MockMeasurementService {
    measurements: RwLock<Vec<Measurement>>,
    list_failure: RwLock<Option<MeasurementServiceError>>,
    creation_failure: RwLock<Option<MeasurementServiceError>>,
    deleted: RwLock<Vec<String>>,
}

impl Default for MockMeasurementService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMeasurementService {
    /// Create a new mock measurement service
    pub fn new() -> Self {
        Self {
            measurements: RwLock::new(Vec::new()),
            list_failure: RwLock::new(None),
            creation_failure: RwLock::new(None),
            deleted: RwLock::new(Vec::new()),
        }
    }

    /// Start with the given measurements stored
    pub fn with_measurements(self, measurements: Vec<Measurement>) -> Self {
        if let Ok(mut stored) = self.measurements.write() {
            *stored = measurements;
        }
        self
    }

    /// Make `list` fail until cleared with `None`
    pub fn set_list_failure(&self, failure: Option<MeasurementServiceError>) {
        if let Ok(mut slot) = self.list_failure.write() {
            *slot = failure;
        }
    }

    /// Make `create` fail until cleared with `None`
    pub fn set_creation_failure(&self, failure: Option<MeasurementServiceError>) {
        if let Ok(mut slot) = self.creation_failure.write() {
            *slot = failure;
        }
    }

    /// Identifiers passed to `delete`
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.read().map(|d| d.clone()).unwrap_or_default()
    }

    fn lock_error() -> MeasurementServiceError {
        MeasurementServiceError::ServerError("Failed to acquire lock".to_string())
    }
}

#[async_trait]
impl MeasurementServiceTrait for MockMeasurementService {
    fn prepare(&self, input: &NewMeasurementInput) -> Result<MeasurementDraft, MeasurementServiceError> {
        coerce_input(input)
    }

    async fn list(&self, range: &DateRange) -> Result<Vec<Measurement>, MeasurementServiceError> {
        if let Some(err) = self.list_failure.read().map_err(|_| Self::lock_error())?.clone() {
            return Err(err);
        }
        let stored = self.measurements.read().map_err(|_| Self::lock_error())?;
        Ok(stored
            .iter()
            .filter(|m| range.contains(m.measurement_date))
            .cloned()
            .collect())
    }

    async fn create(&self, input: &NewMeasurementInput) -> Result<Measurement, MeasurementServiceError> {
        let draft = self.prepare(input)?;
        if let Some(err) = self.creation_failure.read().map_err(|_| Self::lock_error())?.clone() {
            return Err(err);
        }

        let mut stored = self.measurements.write().map_err(|_| Self::lock_error())?;
        let measurement = Measurement {
            id: format!("mock-{}", stored.len() + 1),
            systolic: draft.systolic,
            diastolic: draft.diastolic,
            pulse: draft.pulse,
            measurement_date: draft.measurement_date,
            measurement_time: draft.measurement_time,
            notes: draft.notes,
        };
        stored.push(measurement.clone());
        Ok(measurement)
    }

    async fn delete(&self, id: &str) -> Result<(), MeasurementServiceError> {
        self.deleted
            .write()
            .map_err(|_| Self::lock_error())?
            .push(id.to_string());
        self.measurements
            .write()
            .map_err(|_| Self::lock_error())?
            .retain(|m| m.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_service_failure_can_be_toggled() {
        let service = MockMeasurementService::new()
            .with_measurements(vec![sample_measurement("a", "2024-05-02", "08:00", 120, 80)]);
        let range = DateRange {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        };

        service.set_list_failure(Some(MeasurementServiceError::NetworkError("offline".to_string())));
        assert!(service.list(&range).await.is_err());

        service.set_list_failure(None);
        assert_eq!(service.list(&range).await.unwrap().len(), 1);
    }
}
