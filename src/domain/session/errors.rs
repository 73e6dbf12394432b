//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{AuthError, ValidationError};

/// Errors surfaced by session operations.
///
/// Stored in the session's last-error slot and returned to the caller.
/// Reconciliation failures never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Required input was missing, detected before any provider call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The identity provider rejected or failed the request.
    #[error(transparent)]
    Identity(#[from] AuthError),
}

impl SessionError {
    pub fn empty_field(field: &str) -> Self {
        SessionError::Validation(ValidationError::empty_field(field))
    }

    /// Returns true if the error came from local input checks.
    pub fn is_validation(&self) -> bool {
        matches!(self, SessionError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_inner_error() {
        let err = SessionError::empty_field("email");
        assert_eq!(err.to_string(), "Field 'email' cannot be empty");

        let err = SessionError::from(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Incorrect username or password");
    }

    #[test]
    fn validation_classification() {
        assert!(SessionError::empty_field("code").is_validation());
        assert!(!SessionError::from(AuthError::UserNotFound).is_validation());
    }
}
