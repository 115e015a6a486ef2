use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::entities::{DateRange, Measurement};
use crate::session::SessionStatus;

/// Notifications exchanged between the session gate, the forms and the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The session gate changed state
    SessionChanged(SessionStatus),
    /// A measurement was created through the entry form
    MeasurementAdded(Measurement),
    /// A list response was applied to the dashboard
    MeasurementsLoaded { count: usize },
    /// A measurement was removed after the server confirmed it
    MeasurementDeleted(String),
    /// One of the dashboard date bounds was edited
    DateRangeChanged(DateRange),
}

/// Sending half of the event channel
///
/// A detached notifier drops every event, which keeps components usable on
/// their own in tests.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<AppEvent>>,
}

impl Notifier {
    /// Create a connected notifier and the receiver to drain
    pub fn channel() -> (Self, UnboundedReceiver<AppEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    /// A notifier with no listener
    pub fn detached() -> Self {
        Self::default()
    }

    /// Publish an event; a closed channel is ignored
    pub fn notify(&self, event: AppEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("Event dropped, no listener left");
            }
        }
    }
}
