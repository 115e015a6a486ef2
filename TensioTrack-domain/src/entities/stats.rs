use serde::Serialize;

/// Summary statistics over a set of measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeasurementStats {
    /// Average systolic reading, rounded half-up
    pub avg_systolic: i32,

    /// Average diastolic reading, rounded half-up
    pub avg_diastolic: i32,

    /// Average pulse, rounded half-up
    pub avg_pulse: i32,

    /// Lowest systolic reading
    pub min_systolic: i32,

    /// Highest systolic reading
    pub max_systolic: i32,

    /// Lowest diastolic reading
    pub min_diastolic: i32,

    /// Highest diastolic reading
    pub max_diastolic: i32,

    /// Number of measurements analyzed
    pub count: usize,
}
