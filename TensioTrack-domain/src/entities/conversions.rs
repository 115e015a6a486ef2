use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tensio_track_data::models::auth::UserRecord;
use tensio_track_data::models::measurement::{CreateMeasurementPayload, MeasurementRecord, RangeQuery};

use crate::entities::{DateRange, Measurement, MeasurementDraft, SessionUser};

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Parse a calendar date sent by the API
///
/// Accepts `YYYY-MM-DD` as well as a full RFC 3339 timestamp, in which case the
/// UTC calendar date is used.
pub fn parse_api_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| format!("Invalid date format: {}", raw))
}

/// Parse a time of day sent by the API, `HH:MM` or `HH:MM:SS`
pub fn parse_api_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("Invalid time format: {}", raw))
}

/// Convert from data model to domain entity for a measurement
pub fn convert_to_domain_measurement(record: MeasurementRecord) -> Result<Measurement, String> {
    Ok(Measurement {
        measurement_date: parse_api_date(&record.measurement_date)?,
        measurement_time: parse_api_time(&record.measurement_time)?,
        id: record.id,
        systolic: record.systolic,
        diastolic: record.diastolic,
        pulse: record.pulse,
        notes: record.notes.filter(|n| !n.is_empty()),
    })
}

/// Convert from domain draft to data model for the create request
pub fn convert_to_data_create_payload(draft: &MeasurementDraft) -> CreateMeasurementPayload {
    CreateMeasurementPayload {
        systolic: draft.systolic,
        diastolic: draft.diastolic,
        pulse: draft.pulse,
        measurement_date: draft.measurement_date.format("%Y-%m-%d").to_string(),
        measurement_time: draft.measurement_time.format("%H:%M").to_string(),
        notes: draft.notes.clone().unwrap_or_default(),
    }
}

/// Convert from domain range to the data query
pub fn convert_to_data_range_query(range: &DateRange) -> RangeQuery {
    RangeQuery {
        start_date: range.start_date,
        end_date: range.end_date,
    }
}

/// Convert from data model to domain entity for the session user
///
/// An unparseable date of birth is dropped rather than failing the sign in.
pub fn convert_to_domain_user(record: UserRecord) -> SessionUser {
    SessionUser {
        first_name: record.first_name,
        last_name: record.last_name,
        email: record.email,
        date_of_birth: record
            .date_of_birth
            .as_deref()
            .and_then(|raw| parse_api_date(raw).ok()),
    }
}
