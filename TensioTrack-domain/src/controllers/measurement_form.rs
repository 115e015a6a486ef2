use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use super::FormError;
use crate::entities::{Measurement, MeasurementField, NewMeasurementInput};
use crate::events::{AppEvent, Notifier};
use crate::services::measurement::{coerce_input, MeasurementServiceError, MeasurementServiceTrait};
use crate::session::{Screen, SessionGate};

/// Notice shown after a successful save
pub const SAVED_NOTICE: &str = "Mesure enregistrée avec succès !";

/// Message shown when a failure carries no explanation
pub const SAVE_FAILURE: &str = "Erreur lors de l'enregistrement";

/// New measurement entry form
#[derive(Debug, Serialize)]
pub struct MeasurementFormController {
    input: NewMeasurementInput,
    error: Option<String>,
    notice: Option<String>,
    busy: bool,
    #[serde(skip)]
    notifier: Notifier,
}

impl MeasurementFormController {
    /// Blank form with date and time preset to `now`
    pub fn new(now: NaiveDateTime, notifier: Notifier) -> Self {
        Self {
            input: NewMeasurementInput::starting_at(now),
            error: None,
            notice: None,
            busy: false,
            notifier,
        }
    }

    pub fn input(&self) -> &NewMeasurementInput {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            "Enregistrement..."
        } else {
            "Enregistrer la mesure"
        }
    }

    pub fn set(&mut self, field: MeasurementField, value: impl Into<String>) {
        self.input.set(field, value);
    }

    /// Clear every field back to the defaults for `now`
    pub fn reset(&mut self, now: NaiveDateTime) {
        self.input = NewMeasurementInput::starting_at(now);
    }

    /// Dismiss the success notice
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Check the input and mark the form busy
    ///
    /// Invalid input is reported here and never reaches the service.
    pub fn begin_submit(&mut self) -> Result<NewMeasurementInput, FormError> {
        if self.busy {
            return Err(FormError::Busy);
        }
        self.error = None;
        self.notice = None;

        if let Err(err) = coerce_input(&self.input) {
            let message = Self::message_for(err);
            self.error = Some(message.clone());
            return Err(FormError::Failed(message));
        }

        self.busy = true;
        Ok(self.input.clone())
    }

    /// Record the outcome of a submission and clear the busy flag
    pub fn finish_submit(
        &mut self,
        result: Result<Measurement, MeasurementServiceError>,
        now: NaiveDateTime,
    ) -> Result<Measurement, FormError> {
        self.busy = false;
        match result {
            Ok(measurement) => {
                info!(id = %measurement.id, "Measurement saved");
                self.notice = Some(SAVED_NOTICE.to_string());
                self.reset(now);
                self.notifier
                    .notify(AppEvent::MeasurementAdded(measurement.clone()));
                Ok(measurement)
            }
            Err(err) => {
                warn!("Measurement not saved: {}", err);
                let message = Self::message_for(err);
                self.error = Some(message.clone());
                Err(FormError::Failed(message))
            }
        }
    }

    /// Submit through the measurement service
    pub async fn submit<S: MeasurementServiceTrait + ?Sized>(
        &mut self,
        service: &S,
        gate: &SessionGate,
    ) -> Result<Measurement, FormError> {
        if !gate.can_reach(Screen::MeasurementEntry) {
            return Err(FormError::Unreachable);
        }

        let input = self.begin_submit()?;
        let result = service.create(&input).await;
        self.finish_submit(result, Local::now().naive_local())
    }

    fn message_for(err: MeasurementServiceError) -> String {
        match err {
            MeasurementServiceError::ValidationError(msg) if !msg.is_empty() => msg,
            _ => SAVE_FAILURE.to_string(),
        }
    }
}
