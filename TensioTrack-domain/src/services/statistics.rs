use crate::entities::{Measurement, MeasurementStats};

/// Reduce measurements to summary statistics
///
/// Returns `None` for an empty slice. Averages are rounded half-up.
pub fn aggregate(measurements: &[Measurement]) -> Option<MeasurementStats> {
    let first = measurements.first()?;

    let mut systolic_sum: i64 = 0;
    let mut diastolic_sum: i64 = 0;
    let mut pulse_sum: i64 = 0;

    let mut min_systolic = first.systolic;
    let mut max_systolic = first.systolic;
    let mut min_diastolic = first.diastolic;
    let mut max_diastolic = first.diastolic;

    for measurement in measurements {
        systolic_sum += i64::from(measurement.systolic);
        diastolic_sum += i64::from(measurement.diastolic);
        pulse_sum += i64::from(measurement.pulse);

        min_systolic = min_systolic.min(measurement.systolic);
        max_systolic = max_systolic.max(measurement.systolic);
        min_diastolic = min_diastolic.min(measurement.diastolic);
        max_diastolic = max_diastolic.max(measurement.diastolic);
    }

    let count = measurements.len();
    Some(MeasurementStats {
        avg_systolic: rounded_mean(systolic_sum, count),
        avg_diastolic: rounded_mean(diastolic_sum, count),
        avg_pulse: rounded_mean(pulse_sum, count),
        min_systolic,
        max_systolic,
        min_diastolic,
        max_diastolic,
        count,
    })
}

/// `floor(sum / count + 0.5)` in integer arithmetic
fn rounded_mean(sum: i64, count: usize) -> i32 {
    let count = count as i64;
    (2 * sum + count).div_euclid(2 * count) as i32
}
