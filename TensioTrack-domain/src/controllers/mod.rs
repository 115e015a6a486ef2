// Screen controllers: editable form state and the dashboard collection
pub mod auth_form;
pub mod dashboard;
pub mod measurement_form;

use thiserror::Error;

pub use auth_form::{AuthField, AuthFormController, AuthMode, AuthSubmission};
pub use dashboard::{
    DashboardContent, DashboardController, DashboardView, DeleteConfirmation, DeleteOutcome,
    LoadOutcome, LoadTicket, RecentRow,
};
pub use measurement_form::MeasurementFormController;

/// Outcome of a form submission that did not succeed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    /// A submission is already in flight
    #[error("Submission already in progress")]
    Busy,

    /// The submission failed; the message is the one shown to the user
    #[error("{0}")]
    Failed(String),

    /// The form is not reachable in the current session state
    #[error("Screen not reachable in the current session state")]
    Unreachable,
}
