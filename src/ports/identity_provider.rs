//! Identity provider port for the hosted sign-up / sign-in service.
//!
//! Every flow is delegated: this crate never sees password hashes, tokens
//! or the provider's attribute schema. Results carry completion flags and
//! the provider's [`NextStep`] hint for multi-step flows.
//!
//! # Example
//!
//! ```ignore
//! let result = provider
//!     .sign_in(SignInRequest::with_password("mira@example.com", password))
//!     .await?;
//!
//! if !result.is_signed_in {
//!     // e.g. NextStepKind::ConfirmSignInWithEmailCode
//!     prompt_for(result.next_step);
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::{AuthError, AuthUser, NextStep, UserId};

/// Registration request.
#[derive(Debug)]
pub struct SignUpRequest {
    pub username: String,
    pub password: SecretString,
    /// User attributes, e.g. `email` and `nickname`.
    pub attributes: BTreeMap<String, String>,
    /// Ask the provider to sign the user in once the account is confirmed.
    pub auto_sign_in: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResult {
    pub is_sign_up_complete: bool,
    pub user_id: Option<UserId>,
    pub next_step: Option<NextStep>,
}

/// Challenge the caller would like the provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengePreference {
    Password,
    EmailCode,
}

/// Sign-in request. Without a password the provider starts a one-time-code
/// flow.
#[derive(Debug)]
pub struct SignInRequest {
    pub username: String,
    pub password: Option<SecretString>,
    pub preferred_challenge: Option<ChallengePreference>,
}

impl SignInRequest {
    pub fn with_password(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password: Some(password),
            preferred_challenge: Some(ChallengePreference::Password),
        }
    }

    pub fn with_email_code(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            preferred_challenge: Some(ChallengePreference::EmailCode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResult {
    pub is_signed_in: bool,
    /// Some providers return the user with a completed sign-in; callers
    /// fall back to `get_current_user` when they do not.
    pub user: Option<AuthUser>,
    pub next_step: Option<NextStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordResult {
    pub is_password_reset: bool,
    pub next_step: Option<NextStep>,
}

/// Hosted identity provider.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::NotAuthenticated` from `get_current_user` when no
///   user is signed in
/// - Return `AuthError::ServiceUnavailable` for transport failures
/// - Emit the matching `AuthEvent`s on their event source, if they have one
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpResult, AuthError>;

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
    ) -> Result<SignUpResult, AuthError>;

    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResult, AuthError>;

    async fn confirm_sign_in(&self, challenge_response: &str) -> Result<SignInResult, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn get_current_user(&self) -> Result<AuthUser, AuthError>;

    async fn reset_password(&self, username: &str) -> Result<ResetPasswordResult, AuthError>;

    async fn confirm_reset_password(
        &self,
        username: &str,
        confirmation_code: &str,
        new_password: SecretString,
    ) -> Result<(), AuthError>;
}
