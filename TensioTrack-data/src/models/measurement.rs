use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire model for a blood pressure measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    /// Server assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Systolic blood pressure in mmHg
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg
    pub diastolic: i32,

    /// Pulse in beats per minute
    pub pulse: i32,

    /// Calendar date, either `YYYY-MM-DD` or a full RFC 3339 timestamp
    pub measurement_date: String,

    /// Time of day as `HH:MM`
    pub measurement_time: String,

    /// Optional notes about the measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body sent to `POST /api/measurements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeasurementPayload {
    pub systolic: i32,
    pub diastolic: i32,
    pub pulse: i32,
    /// `YYYY-MM-DD`
    pub measurement_date: String,
    /// `HH:MM`
    pub measurement_time: String,
    /// Empty when the user left the field blank
    pub notes: String,
}

/// Query string for `GET /api/measurements/range`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Response of the range endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementListResponse {
    #[serde(default)]
    pub measurements: Vec<MeasurementRecord>,
}

/// Response of the create endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementResponse {
    pub measurement: MeasurementRecord,
}

impl MeasurementRecord {
    /// The calendar part of `measurement_date`
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let day = self.measurement_date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}
