use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::entities::SessionUser;
use crate::events::{AppEvent, Notifier};

/// Authentication status without the user details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Current state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the start-up session lookup
    Loading,
    /// Signed in
    Authenticated(SessionUser),
    /// No session
    Unauthenticated,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Loading => SessionStatus::Loading,
            SessionState::Authenticated(_) => SessionStatus::Authenticated,
            SessionState::Unauthenticated => SessionStatus::Unauthenticated,
        }
    }
}

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    /// Loading indicator shown while the session is looked up
    Waiting,
    /// Login and registration
    Auth,
    /// New measurement form
    MeasurementEntry,
    /// Statistics, chart and recent measurements
    Dashboard,
}

/// Session transition errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session already established")]
    AlreadyEstablished,

    #[error("Cannot sign in from state {0:?}")]
    CannotSignIn(SessionStatus),

    #[error("No authenticated session")]
    NotAuthenticated,
}

/// Owner of the session state, deciding which screens are reachable
#[derive(Debug)]
pub struct SessionGate {
    state: SessionState,
    notifier: Notifier,
}

impl SessionGate {
    /// New gate in the `Loading` state
    pub fn new(notifier: Notifier) -> Self {
        Self {
            state: SessionState::Loading,
            notifier,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// The signed in user, if any
    pub fn user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Leave `Loading` with the outcome of the session lookup
    pub fn establish(&mut self, restored: Option<SessionUser>) -> Result<SessionStatus, SessionError> {
        if self.state != SessionState::Loading {
            return Err(SessionError::AlreadyEstablished);
        }
        let next = match restored {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Unauthenticated,
        };
        Ok(self.transition(next))
    }

    /// Record a successful login or registration
    pub fn sign_in(&mut self, user: SessionUser) -> Result<SessionStatus, SessionError> {
        if self.state != SessionState::Unauthenticated {
            return Err(SessionError::CannotSignIn(self.status()));
        }
        info!(email = %user.email, "Session opened");
        Ok(self.transition(SessionState::Authenticated(user)))
    }

    /// Destroy the session, handing back the user it held
    pub fn sign_out(&mut self) -> Result<SessionUser, SessionError> {
        match std::mem::replace(&mut self.state, SessionState::Unauthenticated) {
            SessionState::Authenticated(user) => {
                info!(email = %user.email, "Session closed");
                self.notifier
                    .notify(AppEvent::SessionChanged(SessionStatus::Unauthenticated));
                Ok(user)
            }
            previous => {
                self.state = previous;
                Err(SessionError::NotAuthenticated)
            }
        }
    }

    /// Screens reachable in the current state
    pub fn reachable_screens(&self) -> &'static [Screen] {
        match self.state {
            SessionState::Loading => &[Screen::Waiting],
            SessionState::Unauthenticated => &[Screen::Auth],
            SessionState::Authenticated(_) => &[Screen::MeasurementEntry, Screen::Dashboard],
        }
    }

    pub fn can_reach(&self, screen: Screen) -> bool {
        self.reachable_screens().contains(&screen)
    }

    fn transition(&mut self, next: SessionState) -> SessionStatus {
        self.state = next;
        let status = self.status();
        self.notifier.notify(AppEvent::SessionChanged(status));
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_user as ana;

    const ALL_SCREENS: [Screen; 4] = [
        Screen::Waiting,
        Screen::Auth,
        Screen::MeasurementEntry,
        Screen::Dashboard,
    ];

    fn reachable(gate: &SessionGate) -> Vec<Screen> {
        ALL_SCREENS.into_iter().filter(|s| gate.can_reach(*s)).collect()
    }

    #[test]
    fn test_reachability_in_every_state() {
        let mut gate = SessionGate::new(Notifier::detached());
        assert_eq!(reachable(&gate), vec![Screen::Waiting]);

        gate.establish(None).unwrap();
        assert_eq!(reachable(&gate), vec![Screen::Auth]);

        gate.sign_in(ana()).unwrap();
        assert_eq!(reachable(&gate), vec![Screen::MeasurementEntry, Screen::Dashboard]);
        assert!(!gate.can_reach(Screen::Auth));

        gate.sign_out().unwrap();
        assert_eq!(reachable(&gate), vec![Screen::Auth]);
        assert_eq!(gate.user(), None);
    }

    #[test]
    fn test_establish_with_restored_session() {
        let (notifier, mut events) = Notifier::channel();
        let mut gate = SessionGate::new(notifier);

        assert_eq!(gate.establish(Some(ana())).unwrap(), SessionStatus::Authenticated);
        assert_eq!(gate.user().map(|u| u.first_name.as_str()), Some("Ana"));
        assert_eq!(
            events.try_recv().unwrap(),
            AppEvent::SessionChanged(SessionStatus::Authenticated)
        );
        assert_eq!(gate.establish(None), Err(SessionError::AlreadyEstablished));
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut gate = SessionGate::new(Notifier::detached());
        assert_eq!(gate.sign_in(ana()), Err(SessionError::CannotSignIn(SessionStatus::Loading)));
        assert_eq!(gate.sign_out(), Err(SessionError::NotAuthenticated));
        assert_eq!(gate.status(), SessionStatus::Loading);

        gate.establish(Some(ana())).unwrap();
        assert_eq!(
            gate.sign_in(ana()),
            Err(SessionError::CannotSignIn(SessionStatus::Authenticated))
        );
    }

    #[test]
    fn test_sign_out_notifies() {
        let (notifier, mut events) = Notifier::channel();
        let mut gate = SessionGate::new(notifier);
        gate.establish(Some(ana())).unwrap();
        let _ = events.try_recv();

        let user = gate.sign_out().unwrap();
        assert_eq!(user.email, "ana@example.org");
        assert_eq!(
            events.try_recv().unwrap(),
            AppEvent::SessionChanged(SessionStatus::Unauthenticated)
        );
    }
}
