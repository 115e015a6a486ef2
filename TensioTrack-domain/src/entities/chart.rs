use chrono::NaiveDateTime;
use serde::Serialize;

/// One point of the blood pressure time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub systolic: i32,
    pub diastolic: i32,
    pub pulse: i32,
    /// `DD/MM/YYYY HH:MM`
    pub sort_key: String,
    /// Underlying date and time the series is ordered by
    #[serde(skip)]
    pub timestamp: NaiveDateTime,
}
