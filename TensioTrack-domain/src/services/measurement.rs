use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use validator::Validate;

use crate::entities::conversions;
use crate::entities::{DateRange, Measurement, MeasurementDraft, NewMeasurementInput};
use tensio_track_data::repository::{
    HttpMeasurementRepository, MeasurementRepositoryTrait, RepositoryError,
};
use tensio_track_data::ApiClient;

/// Measurement service errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeasurementServiceError {
    /// Input rejected, either locally before submission or by the server
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No response was received
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The server answered with a failure or an unreadable body
    #[error("Server error: {0}")]
    ServerError(String),
}

/// Trait for measurement service operations
#[async_trait]
pub trait MeasurementServiceTrait: Send + Sync {
    /// Coerce and validate user input without submitting it
    fn prepare(&self, input: &NewMeasurementInput) -> Result<MeasurementDraft, MeasurementServiceError>;

    /// Measurements taken within the range
    async fn list(&self, range: &DateRange) -> Result<Vec<Measurement>, MeasurementServiceError>;

    /// Create a measurement from user input
    async fn create(&self, input: &NewMeasurementInput) -> Result<Measurement, MeasurementServiceError>;

    /// Delete a measurement
    async fn delete(&self, id: &str) -> Result<(), MeasurementServiceError>;
}

/// Measurement service on top of a repository
pub struct MeasurementService<R: MeasurementRepositoryTrait> {
    repository: R,
}

impl<R: MeasurementRepositoryTrait> MeasurementService<R> {
    /// Create a new measurement service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MeasurementServiceError {
        match err {
            RepositoryError::Validation(msg) => MeasurementServiceError::ValidationError(msg),
            RepositoryError::Network(msg) => MeasurementServiceError::NetworkError(msg),
            other => MeasurementServiceError::ServerError(other.to_string()),
        }
    }
}

/// Parse a required integer field
fn parse_required_int(raw: &str, label: &str) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("{} : champ requis", label));
    }
    raw.parse::<i32>()
        .map_err(|_| format!("{} : nombre entier attendu", label))
}

/// Coerce the typed text into a draft, then validate the input ranges
pub fn coerce_input(input: &NewMeasurementInput) -> Result<MeasurementDraft, MeasurementServiceError> {
    let mut problems = Vec::new();

    let systolic = parse_required_int(&input.systolic, "Systolique").map_err(|e| problems.push(e)).ok();
    let diastolic = parse_required_int(&input.diastolic, "Diastolique").map_err(|e| problems.push(e)).ok();
    let pulse = parse_required_int(&input.pulse, "Pouls").map_err(|e| problems.push(e)).ok();
    let measurement_date = chrono::NaiveDate::parse_from_str(input.measurement_date.trim(), "%Y-%m-%d")
        .map_err(|_| problems.push("Date : format AAAA-MM-JJ attendu".to_string()))
        .ok();
    let measurement_time = chrono::NaiveTime::parse_from_str(input.measurement_time.trim(), "%H:%M")
        .map_err(|_| problems.push("Heure : format HH:MM attendu".to_string()))
        .ok();

    let (Some(systolic), Some(diastolic), Some(pulse), Some(measurement_date), Some(measurement_time)) =
        (systolic, diastolic, pulse, measurement_date, measurement_time)
    else {
        return Err(MeasurementServiceError::ValidationError(problems.join("; ")));
    };

    let notes = Some(input.notes.trim().to_string()).filter(|n| !n.is_empty());
    let draft = MeasurementDraft {
        systolic,
        diastolic,
        pulse,
        measurement_date,
        measurement_time,
        notes,
    };

    if let Err(validation_errors) = draft.validate() {
        // Keep a stable field order in the message
        let mut fields: Vec<_> = validation_errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let error_message = fields
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Valeur invalide : {}", field),
                })
            })
            .collect::<Vec<String>>()
            .join("; ");
        return Err(MeasurementServiceError::ValidationError(error_message));
    }

    Ok(draft)
}

#[async_trait]
impl<R: MeasurementRepositoryTrait> MeasurementServiceTrait for MeasurementService<R> {
    fn prepare(&self, input: &NewMeasurementInput) -> Result<MeasurementDraft, MeasurementServiceError> {
        coerce_input(input)
    }

    async fn list(&self, range: &DateRange) -> Result<Vec<Measurement>, MeasurementServiceError> {
        let records = self
            .repository
            .list(conversions::convert_to_data_range_query(range))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let measurements = records
            .into_iter()
            .map(conversions::convert_to_domain_measurement)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!("Discarding list response: {}", e);
                MeasurementServiceError::ServerError(format!("Invalid payload: {}", e))
            })?;

        debug!(
            "Loaded {} measurements between {} and {}",
            measurements.len(),
            range.start_date,
            range.end_date
        );
        Ok(measurements)
    }

    async fn create(&self, input: &NewMeasurementInput) -> Result<Measurement, MeasurementServiceError> {
        // Validate before anything is sent
        let draft = self.prepare(input)?;

        let payload = conversions::convert_to_data_create_payload(&draft);
        let record = self
            .repository
            .create(payload)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_measurement(record)
            .map_err(|e| MeasurementServiceError::ServerError(format!("Invalid payload: {}", e)))
    }

    async fn delete(&self, id: &str) -> Result<(), MeasurementServiceError> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| self.map_repo_error(e))
    }
}

/// Create a measurement service talking to the remote API
pub fn create_remote_measurement_service(
    client: ApiClient,
) -> MeasurementService<HttpMeasurementRepository> {
    MeasurementService::new(HttpMeasurementRepository::new(client))
}
