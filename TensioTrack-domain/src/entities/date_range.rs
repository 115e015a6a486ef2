use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

/// Number of days covered by the default dashboard range
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Date bounds of the dashboard query, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        Self::ending_on(Local::now().date_naive())
    }
}

impl DateRange {
    /// The default range: the 30 days before `today`, through `today`
    pub fn ending_on(today: NaiveDate) -> Self {
        Self {
            start_date: today - Duration::days(DEFAULT_RANGE_DAYS),
            end_date: today,
        }
    }

    /// Copy with a new start date
    pub fn with_start_date(self, start_date: NaiveDate) -> Self {
        Self { start_date, ..self }
    }

    /// Copy with a new end date
    pub fn with_end_date(self, end_date: NaiveDate) -> Self {
        Self { end_date, ..self }
    }

    /// Whether `day` falls within the range
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }
}
