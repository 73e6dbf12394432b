//! Observable session state.

use crate::domain::foundation::{AuthUser, NextStep};

use super::SessionError;

/// Snapshot of the signed-in session as the rest of the application sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user, if any.
    pub user: Option<AuthUser>,

    /// True while a session operation is in flight.
    pub loading: bool,

    /// Error from the most recent failed operation.
    pub last_error: Option<SessionError>,

    /// What the identity provider needs next in a multi-step flow.
    pub next_step: Option<NextStep>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Message of the last error, or an empty string.
    pub fn error_message(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}
