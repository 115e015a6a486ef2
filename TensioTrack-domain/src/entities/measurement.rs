use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use validator::Validate;

/// Domain model for a blood pressure measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measurement {
    /// Server assigned identifier
    pub id: String,

    /// Systolic blood pressure (the higher number), mmHg
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number), mmHg
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Day the measurement was taken
    pub measurement_date: NaiveDate,

    /// Time of day the measurement was taken
    pub measurement_time: NaiveTime,

    /// Optional notes about the measurement
    pub notes: Option<String>,
}

impl Measurement {
    /// Combined date and time, used for chronological ordering
    pub fn taken_at(&self) -> NaiveDateTime {
        self.measurement_date.and_time(self.measurement_time)
    }
}

/// Fields of the measurement entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementField {
    Systolic,
    Diastolic,
    Pulse,
    Date,
    Time,
    Notes,
}

/// Measurement as typed by the user, before coercion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewMeasurementInput {
    pub systolic: String,
    pub diastolic: String,
    pub pulse: String,
    /// `YYYY-MM-DD`
    pub measurement_date: String,
    /// `HH:MM`
    pub measurement_time: String,
    pub notes: String,
}

impl NewMeasurementInput {
    /// Blank input with date and time preset to `now`
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            measurement_date: now.format("%Y-%m-%d").to_string(),
            measurement_time: now.format("%H:%M").to_string(),
            ..Self::default()
        }
    }

    /// Replace the value of one field
    pub fn set(&mut self, field: MeasurementField, value: impl Into<String>) {
        let value = value.into();
        match field {
            MeasurementField::Systolic => self.systolic = value,
            MeasurementField::Diastolic => self.diastolic = value,
            MeasurementField::Pulse => self.pulse = value,
            MeasurementField::Date => self.measurement_date = value,
            MeasurementField::Time => self.measurement_time = value,
            MeasurementField::Notes => self.notes = value,
        }
    }
}

/// Coerced measurement, validated against the input ranges before submission
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct MeasurementDraft {
    #[validate(range(min = 50, max = 300, message = "La pression systolique doit être entre 50 et 300 mmHg"))]
    pub systolic: i32,

    #[validate(range(min = 30, max = 200, message = "La pression diastolique doit être entre 30 et 200 mmHg"))]
    pub diastolic: i32,

    #[validate(range(min = 30, max = 220, message = "Le pouls doit être entre 30 et 220 bpm"))]
    pub pulse: i32,

    pub measurement_date: NaiveDate,

    pub measurement_time: NaiveTime,

    #[validate(length(max = 500, message = "Les notes ne peuvent pas dépasser 500 caractères"))]
    pub notes: Option<String>,
}
