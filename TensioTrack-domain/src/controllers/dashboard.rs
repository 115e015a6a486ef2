use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::entities::{ChartPoint, Classification, DateRange, Measurement, MeasurementStats};
use crate::events::{AppEvent, Notifier};
use crate::services::chart::{build_series, format_day};
use crate::services::classifier::classify;
use crate::services::measurement::{MeasurementServiceError, MeasurementServiceTrait};
use crate::services::statistics::aggregate;
use crate::session::SessionStatus;

pub const LOAD_FAILURE: &str = "Erreur lors du chargement des données";
pub const DELETE_FAILURE: &str = "Erreur lors de la suppression de la mesure";
pub const EMPTY_PERIOD: &str = "Aucune mesure trouvée pour cette période.";

/// Rows shown in the recent measurements table
pub const RECENT_ROWS: usize = 10;

/// Asks the user to confirm a deletion before any request is sent
#[async_trait]
pub trait DeleteConfirmation: Send + Sync {
    async fn confirm(&self, measurement: &Measurement) -> bool;
}

/// Stamp of one list request; only the latest one may be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    range: DateRange,
}

impl LoadTicket {
    pub fn range(&self) -> &DateRange {
        &self.range
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the dashboard state
    Applied,
    /// A newer request was started; the result was dropped
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    /// The identifier is not in the collection
    NotFound,
    /// A delete for this identifier is already in flight
    Busy,
    Failed,
}

/// One row of the recent measurements table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRow {
    pub id: String,
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub systolic: i32,
    pub diastolic: i32,
    pub pulse: i32,
    pub classification: Classification,
    pub label: &'static str,
    pub deleting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardContent {
    Empty { message: &'static str },
    Data { series: Vec<ChartPoint>, recent: Vec<RecentRow> },
}

/// Everything the dashboard screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub range: DateRange,
    pub loading: bool,
    pub error: Option<String>,
    pub stats: Option<MeasurementStats>,
    pub content: DashboardContent,
}

/// Owner of the dashboard collection and date range
#[derive(Debug)]
pub struct DashboardController {
    measurements: Vec<Measurement>,
    range: DateRange,
    loading: bool,
    error: Option<String>,
    deleting: BTreeSet<String>,
    generation: u64,
    notifier: Notifier,
}

impl DashboardController {
    pub fn new(range: DateRange, notifier: Notifier) -> Self {
        Self {
            measurements: Vec::new(),
            range,
            loading: false,
            error: None,
            deleting: BTreeSet::new(),
            generation: 0,
            notifier,
        }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    /// Start a list request for the current range
    ///
    /// Any ticket handed out before this one becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
            range: self.range,
        }
    }

    /// Apply a list result unless a newer request was started since
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Measurement>, MeasurementServiceError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Dropping stale list response"
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(measurements) => {
                let count = measurements.len();
                self.measurements = measurements;
                self.error = None;
                self.notifier.notify(AppEvent::MeasurementsLoaded { count });
            }
            Err(err) => {
                warn!("Error fetching measurements: {}", err);
                self.error = Some(LOAD_FAILURE.to_string());
            }
        }
        LoadOutcome::Applied
    }

    /// Run a list request issued with `ticket`
    pub async fn load<S: MeasurementServiceTrait + ?Sized>(
        &mut self,
        service: &S,
        ticket: LoadTicket,
    ) -> LoadOutcome {
        let result = service.list(ticket.range()).await;
        self.apply_load(ticket, result)
    }

    /// Reload the current range
    pub async fn refresh<S: MeasurementServiceTrait + ?Sized>(&mut self, service: &S) -> LoadOutcome {
        let ticket = self.begin_load();
        self.load(service, ticket).await
    }

    /// Edit the lower bound; returns the ticket of the reload to run
    pub fn set_start_date(&mut self, start_date: NaiveDate) -> LoadTicket {
        self.change_range(self.range.with_start_date(start_date))
    }

    /// Edit the upper bound; returns the ticket of the reload to run
    pub fn set_end_date(&mut self, end_date: NaiveDate) -> LoadTicket {
        self.change_range(self.range.with_end_date(end_date))
    }

    fn change_range(&mut self, range: DateRange) -> LoadTicket {
        self.range = range;
        self.notifier.notify(AppEvent::DateRangeChanged(range));
        self.begin_load()
    }

    /// Mark a delete in flight, returning the measurement it targets
    pub fn begin_delete(&mut self, id: &str) -> Result<Measurement, DeleteOutcome> {
        let measurement = self
            .measurements
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(DeleteOutcome::NotFound)?;
        if !self.deleting.insert(id.to_string()) {
            return Err(DeleteOutcome::Busy);
        }
        Ok(measurement)
    }

    /// Record the server outcome of a delete
    pub fn finish_delete(
        &mut self,
        id: &str,
        result: Result<(), MeasurementServiceError>,
    ) -> DeleteOutcome {
        self.deleting.remove(id);
        match result {
            Ok(()) => {
                self.measurements.retain(|m| m.id != id);
                self.error = None;
                info!(id, "Measurement deleted");
                self.notifier
                    .notify(AppEvent::MeasurementDeleted(id.to_string()));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!("Error deleting measurement {}: {}", id, err);
                self.error = Some(DELETE_FAILURE.to_string());
                DeleteOutcome::Failed
            }
        }
    }

    /// Confirm with the user, then delete remotely and locally
    ///
    /// Unknown identifiers are a no-op: nothing is asked and nothing is sent.
    pub async fn delete<S, C>(&mut self, service: &S, confirmation: &C, id: &str) -> DeleteOutcome
    where
        S: MeasurementServiceTrait + ?Sized,
        C: DeleteConfirmation + ?Sized,
    {
        let Some(measurement) = self.measurements.iter().find(|m| m.id == id).cloned() else {
            debug!(id, "Delete requested for a measurement not on screen");
            return DeleteOutcome::NotFound;
        };
        if self.is_deleting(id) {
            return DeleteOutcome::Busy;
        }
        if !confirmation.confirm(&measurement).await {
            return DeleteOutcome::Cancelled;
        }

        if let Err(outcome) = self.begin_delete(id) {
            return outcome;
        }
        let result = service.delete(id).await;
        self.finish_delete(id, result)
    }

    /// React to events from the rest of the application
    ///
    /// Returns whether the dashboard state changed.
    pub fn handle_event(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::MeasurementAdded(measurement) => {
                if !self.range.contains(measurement.measurement_date)
                    || self.measurements.iter().any(|m| m.id == measurement.id)
                {
                    return false;
                }
                self.measurements.insert(0, measurement.clone());
                true
            }
            AppEvent::SessionChanged(SessionStatus::Unauthenticated) => {
                self.measurements.clear();
                self.deleting.clear();
                self.error = None;
                // Results of requests issued by the closed session must not land
                self.generation += 1;
                self.loading = false;
                true
            }
            _ => false,
        }
    }

    /// Current view of the dashboard
    pub fn view(&self) -> DashboardView {
        let content = if self.measurements.is_empty() {
            DashboardContent::Empty {
                message: EMPTY_PERIOD,
            }
        } else {
            DashboardContent::Data {
                series: build_series(&self.measurements),
                recent: self
                    .measurements
                    .iter()
                    .take(RECENT_ROWS)
                    .map(|m| self.recent_row(m))
                    .collect(),
            }
        };

        DashboardView {
            range: self.range,
            loading: self.loading,
            error: self.error.clone(),
            stats: aggregate(&self.measurements),
            content,
        }
    }

    fn recent_row(&self, measurement: &Measurement) -> RecentRow {
        let classification = classify(measurement.systolic, measurement.diastolic);
        RecentRow {
            id: measurement.id.clone(),
            date: format_day(measurement),
            time: measurement.measurement_time.format("%H:%M").to_string(),
            systolic: measurement.systolic,
            diastolic: measurement.diastolic,
            pulse: measurement.pulse,
            label: classification.category.label(),
            classification,
            deleting: self.is_deleting(&measurement.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BloodPressureCategory;
    use crate::services::measurement::MeasurementService;
    use chrono::NaiveTime;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tensio_track_data::models::measurement::MeasurementRecord;
    use tensio_track_data::repository::{InMemoryMeasurementRepository, RepositoryError};

    struct Answer {
        accept: bool,
        asked: AtomicUsize,
    }

    impl Answer {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                asked: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DeleteConfirmation for Answer {
        async fn confirm(&self, _measurement: &Measurement) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.accept
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn may() -> DateRange {
        DateRange {
            start_date: day(1),
            end_date: day(31),
        }
    }

    fn measurement(id: &str, d: u32, systolic: i32, diastolic: i32) -> Measurement {
        Measurement {
            id: id.to_string(),
            systolic,
            diastolic,
            pulse: 70,
            measurement_date: day(d),
            measurement_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            notes: None,
        }
    }

    fn record(id: &str, d: u32) -> MeasurementRecord {
        MeasurementRecord {
            id: id.to_string(),
            systolic: 120,
            diastolic: 80,
            pulse: 60,
            measurement_date: format!("2024-05-{:02}", d),
            measurement_time: "08:00".to_string(),
            notes: None,
        }
    }

    fn loaded(measurements: Vec<Measurement>) -> DashboardController {
        let mut dashboard = DashboardController::new(may(), Notifier::detached());
        let ticket = dashboard.begin_load();
        dashboard.apply_load(ticket, Ok(measurements));
        dashboard
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut dashboard = DashboardController::new(may(), Notifier::detached());
        let first = dashboard.begin_load();
        let second = dashboard.set_end_date(day(15));

        assert_eq!(dashboard.apply_load(second, Ok(vec![measurement("new", 3, 120, 80)])), LoadOutcome::Applied);
        assert_eq!(
            dashboard.apply_load(first, Ok(vec![measurement("old", 20, 120, 80)])),
            LoadOutcome::Stale
        );

        assert_eq!(dashboard.measurements().len(), 1);
        assert_eq!(dashboard.measurements()[0].id, "new");
        assert!(!dashboard.is_loading());
        assert_eq!(second.range().end_date, day(15));
    }

    #[test]
    fn test_load_failure_keeps_previous_collection() {
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);
        let ticket = dashboard.begin_load();
        assert!(dashboard.is_loading());

        dashboard.apply_load(ticket, Err(MeasurementServiceError::NetworkError("offline".to_string())));
        assert_eq!(dashboard.error(), Some(LOAD_FAILURE));
        assert_eq!(dashboard.measurements().len(), 1);
        assert!(!dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_from_service() {
        let service = MeasurementService::new(InMemoryMeasurementRepository::with_records(vec![
            record("a", 2),
            record("b", 9),
        ]));
        let (notifier, mut events) = Notifier::channel();
        let mut dashboard = DashboardController::new(may(), notifier);

        assert_eq!(dashboard.refresh(&service).await, LoadOutcome::Applied);
        assert_eq!(dashboard.measurements().len(), 2);
        assert_eq!(events.try_recv().unwrap(), AppEvent::MeasurementsLoaded { count: 2 });
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_after_success() {
        let repo = InMemoryMeasurementRepository::with_records(vec![record("a", 2), record("b", 9)]);
        let service = MeasurementService::new(repo.clone());
        let mut dashboard = DashboardController::new(may(), Notifier::detached());
        dashboard.refresh(&service).await;

        let outcome = dashboard.delete(&service, &Answer::new(true), "a").await;
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(dashboard.measurements().len(), 1);
        assert_eq!(repo.deleted(), vec!["a".to_string()]);
        assert!(!dashboard.is_deleting("a"));
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let repo = InMemoryMeasurementRepository::new();
        let service = MeasurementService::new(repo.clone());
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);

        let outcome = dashboard.delete(&service, &Answer::new(false), "a").await;
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(dashboard.measurements().len(), 1);
        assert!(repo.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_leaves_collection_unchanged() {
        let repo = InMemoryMeasurementRepository::new();
        let service = MeasurementService::new(repo.clone());
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);
        let answer = Answer::new(true);

        let outcome = dashboard.delete(&service, &answer, "zzz").await;
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(dashboard.measurements().len(), 1);
        assert_eq!(answer.asked.load(Ordering::SeqCst), 0);
        assert!(repo.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row() {
        let service = MeasurementService::new(
            InMemoryMeasurementRepository::new()
                .with_failure(RepositoryError::Server {
                    status: 500,
                    message: "boom".to_string(),
                }),
        );
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);

        let outcome = dashboard.delete(&service, &Answer::new(true), "a").await;
        assert_eq!(outcome, DeleteOutcome::Failed);
        assert_eq!(dashboard.error(), Some(DELETE_FAILURE));
        assert_eq!(dashboard.measurements().len(), 1);
    }

    #[test]
    fn test_one_delete_per_id_in_flight() {
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);
        assert!(dashboard.begin_delete("a").is_ok());
        assert_eq!(dashboard.begin_delete("a"), Err(DeleteOutcome::Busy));

        let view = dashboard.view();
        match view.content {
            DashboardContent::Data { recent, .. } => assert!(recent[0].deleting),
            other => panic!("unexpected content {:?}", other),
        }
        assert_eq!(dashboard.finish_delete("a", Ok(())), DeleteOutcome::Deleted);
    }

    #[test]
    fn test_added_measurement_inside_range_is_inserted_first() {
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);

        let inside = AppEvent::MeasurementAdded(measurement("b", 20, 150, 95));
        assert!(dashboard.handle_event(&inside));
        assert_eq!(dashboard.measurements()[0].id, "b");
        assert!(!dashboard.handle_event(&inside));

        let outside = Measurement {
            measurement_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            ..measurement("c", 1, 120, 80)
        };
        assert!(!dashboard.handle_event(&AppEvent::MeasurementAdded(outside)));
        assert_eq!(dashboard.measurements().len(), 2);
    }

    #[test]
    fn test_logout_clears_collection_and_pending_loads() {
        let mut dashboard = loaded(vec![measurement("a", 2, 120, 80)]);
        let pending = dashboard.begin_load();

        assert!(dashboard.handle_event(&AppEvent::SessionChanged(SessionStatus::Unauthenticated)));
        assert!(dashboard.measurements().is_empty());
        assert_eq!(
            dashboard.apply_load(pending, Ok(vec![measurement("b", 3, 120, 80)])),
            LoadOutcome::Stale
        );
    }

    #[test]
    fn test_empty_period_view() {
        let dashboard = loaded(Vec::new());
        let view = dashboard.view();
        assert_eq!(view.stats, None);
        assert_eq!(view.error, None);
        assert_eq!(
            view.content,
            DashboardContent::Empty {
                message: EMPTY_PERIOD
            }
        );
    }

    #[test]
    fn test_view_with_data() {
        let mut measurements: Vec<Measurement> = (1..=12)
            .map(|d| measurement(&format!("m{}", d), d, 118, 75))
            .collect();
        measurements[0] = measurement("m1", 1, 185, 70);
        let dashboard = loaded(measurements);

        let view = dashboard.view();
        let stats = view.stats.unwrap();
        assert_eq!(stats.count, 12);
        assert_eq!(stats.max_systolic, 185);

        match view.content {
            DashboardContent::Data { series, recent } => {
                assert_eq!(series.len(), 12);
                assert_eq!(series[0].date, "01/05/2024");
                assert_eq!(recent.len(), RECENT_ROWS);
                assert_eq!(recent[0].classification.category, BloodPressureCategory::HypertensionGrade3);
                assert_eq!(recent[0].label, "Hypertension grade 3");
                assert_eq!(recent[1].classification.category, BloodPressureCategory::Optimal);
                assert_eq!(recent[1].time, "08:30");
            }
            other => panic!("unexpected content {:?}", other),
        }
    }
}
