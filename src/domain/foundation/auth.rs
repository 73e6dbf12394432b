//! Authentication types for the domain layer.
//!
//! These types describe a signed-in user and the outcomes of identity
//! provider flows. They have **no provider dependencies**: any hosted
//! identity service can populate them through the `IdentityProvider` port.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// The user currently signed in with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable identifier issued by the identity provider.
    pub user_id: UserId,

    /// The name the user signs in with (the normalized email).
    pub username: String,
}

impl AuthUser {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Hint from the identity provider about what the user must do next to
/// finish a multi-step flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub kind: NextStepKind,

    /// Where a one-time code was sent, when the step involves one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_delivery: Option<CodeDeliveryDetails>,
}

impl NextStep {
    pub fn new(kind: NextStepKind) -> Self {
        Self {
            kind,
            code_delivery: None,
        }
    }

    pub fn with_code_delivery(mut self, details: CodeDeliveryDetails) -> Self {
        self.code_delivery = Some(details);
        self
    }

    pub fn done() -> Self {
        Self::new(NextStepKind::Done)
    }

    /// True when the step asks for a challenge response
    /// (see `SessionManager::complete_sign_in`).
    pub fn awaits_challenge_response(&self) -> bool {
        matches!(
            self.kind,
            NextStepKind::ConfirmSignInWithEmailCode
                | NextStepKind::ConfirmSignInWithSmsCode
                | NextStepKind::ConfirmSignInWithTotpCode
                | NextStepKind::ConfirmSignInWithNewPassword
        )
    }
}

/// The step kinds surfaced by sign-up, sign-in and password reset flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextStepKind {
    ConfirmSignUp,
    CompleteAutoSignIn,
    ConfirmSignInWithEmailCode,
    ConfirmSignInWithSmsCode,
    ConfirmSignInWithTotpCode,
    ConfirmSignInWithNewPassword,
    ResetPassword,
    ConfirmResetPasswordWithCode,
    Done,
}

/// Where a verification code was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDeliveryDetails {
    /// Masked destination, e.g. `a***@e***.com`.
    pub destination: String,
    pub medium: DeliveryMedium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMedium {
    Email,
    Sms,
}

/// Errors reported by the identity provider.
///
/// These errors are **domain-centric**: adapters translate provider
/// exception names into these variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No user is signed in. Expected on first load.
    #[error("User is not authenticated")]
    NotAuthenticated,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("An account with this username already exists")]
    UserAlreadyExists,

    #[error("Invalid verification code")]
    CodeMismatch,

    #[error("Verification code has expired")]
    CodeExpired,

    /// The password does not satisfy the provider's policy.
    #[error("Password does not meet requirements: {0}")]
    InvalidPassword(String),

    #[error("Attempt limit exceeded, try again later")]
    LimitExceeded,

    /// The identity service is unavailable (network, config, etc.).
    #[error("Identity service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::ServiceUnavailable(_) | AuthError::LimitExceeded
        )
    }
}
