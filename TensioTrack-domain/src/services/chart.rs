use crate::entities::{ChartPoint, Measurement};

/// Build the chronological series plotted on the dashboard
///
/// Points are ordered by measurement date then time. The sort is stable, so
/// measurements taken at the same minute keep their input order.
pub fn build_series(measurements: &[Measurement]) -> Vec<ChartPoint> {
    let mut series: Vec<ChartPoint> = measurements.iter().map(to_point).collect();
    series.sort_by_key(|point| point.timestamp);
    series
}

/// Day formatted the French way, `DD/MM/YYYY`
pub fn format_day(measurement: &Measurement) -> String {
    measurement.measurement_date.format("%d/%m/%Y").to_string()
}

fn to_point(measurement: &Measurement) -> ChartPoint {
    let date = format_day(measurement);
    let time = measurement.measurement_time.format("%H:%M").to_string();
    ChartPoint {
        sort_key: format!("{} {}", date, time),
        date,
        time,
        systolic: measurement.systolic,
        diastolic: measurement.diastolic,
        pulse: measurement.pulse,
        timestamp: measurement.taken_at(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(id: &str, date: (i32, u32, u32), time: (u32, u32)) -> Measurement {
        Measurement {
            id: id.to_string(),
            systolic: 120,
            diastolic: 80,
            pulse: 60,
            measurement_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            measurement_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_points_are_formatted() {
        let series = build_series(&[at("a", (2024, 3, 7), (9, 5))]);
        assert_eq!(series[0].date, "07/03/2024");
        assert_eq!(series[0].time, "09:05");
        assert_eq!(series[0].sort_key, "07/03/2024 09:05");
    }

    #[test]
    fn test_series_is_chronological() {
        // Day-first strings would sort 02/04 before 10/03; the series must not
        let input = vec![
            at("late", (2024, 4, 2), (7, 0)),
            at("evening", (2024, 3, 10), (21, 0)),
            at("morning", (2024, 3, 10), (7, 30)),
            at("new-year", (2023, 12, 31), (23, 59)),
        ];

        let ids: Vec<String> = build_series(&input)
            .iter()
            .map(|p| input.iter().find(|m| m.taken_at() == p.timestamp).unwrap().id.clone())
            .collect();
        assert_eq!(ids, vec!["new-year", "morning", "evening", "late"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut first = at("first", (2024, 3, 10), (8, 0));
        first.systolic = 111;
        let mut second = at("second", (2024, 3, 10), (8, 0));
        second.systolic = 222;

        let series = build_series(&[second.clone(), first.clone()]);
        assert_eq!(series[0].systolic, 222);
        assert_eq!(series[1].systolic, 111);
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let input = vec![
            at("b", (2024, 3, 11), (8, 0)),
            at("a", (2024, 3, 10), (8, 0)),
            at("c", (2024, 3, 10), (8, 0)),
        ];
        let series = build_series(&input);

        let mut resorted = series.clone();
        resorted.sort_by_key(|point| point.timestamp);
        assert_eq!(resorted, series);
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_series(&[]).is_empty());
    }
}
