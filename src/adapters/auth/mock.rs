//! Mock identity provider for testing.
//!
//! Implements the `IdentityProvider` port in memory, following the hosted
//! provider's flow rules closely enough to drive the session manager:
//!
//! - sign-up creates an unconfirmed account and asks for a code, unless
//!   auto-confirm is enabled
//! - confirming sign-up with auto sign-in signs the user in and emits
//!   `AutoSignedIn`
//! - sign-in with an email-code challenge, or without a password, asks for
//!   a one-time code that `confirm_sign_in` accepts
//! - password reset issues a code that `confirm_reset_password` checks
//!
//! Every code the mock issues equals the configured verification code
//! (`"123456"` unless changed).
//!
//! # Example
//!
//! ```ignore
//! let hub = Arc::new(InMemoryAuthHub::new());
//! let provider = MockIdentityProvider::new()
//!     .with_account("mira@example.com", "correct horse", "user-1")
//!     .with_event_hub(hub.clone());
//!
//! let result = provider
//!     .sign_in(SignInRequest::with_password("mira@example.com", secret("correct horse")))
//!     .await?;
//! assert!(result.is_signed_in);
//! assert!(hub.has_event(AuthEvent::SignedIn));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::events::InMemoryAuthHub;
use crate::domain::foundation::{
    AuthError, AuthUser, CodeDeliveryDetails, DeliveryMedium, NextStep, NextStepKind, UserId,
};
use crate::domain::session::AuthEvent;
use crate::ports::{
    ChallengePreference, IdentityProvider, ResetPasswordResult, SignInRequest, SignInResult,
    SignUpRequest, SignUpResult,
};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
    confirmed: bool,
    auto_sign_in: bool,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    /// Username waiting for a sign-in challenge response.
    pending_challenge: Option<String>,
    /// Usernames with an outstanding password reset.
    pending_resets: Vec<String>,
    next_user: u64,
}

/// Mock identity provider for testing.
pub struct MockIdentityProvider {
    state: RwLock<MockState>,
    code: String,
    require_email_code: bool,
    auto_confirm: bool,
    force_error: RwLock<Option<AuthError>>,
    hub: Option<Arc<InMemoryAuthHub>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
            code: "123456".to_string(),
            require_email_code: false,
            auto_confirm: false,
            force_error: RwLock::new(None),
            hub: None,
        }
    }
}

impl MockIdentityProvider {
    /// Creates a provider with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a confirmed account.
    pub fn with_account(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let account = Account {
            user_id: UserId::new(user_id).expect("MockIdentityProvider: empty user id"),
            password: password.into(),
            confirmed: true,
            auto_sign_in: false,
        };
        self.lock_state().accounts.insert(username.into(), account);
        self
    }

    /// Starts with `username` already signed in. The account must exist.
    pub fn with_signed_in(self, username: &str) -> Self {
        {
            let mut state = self.lock_state();
            let user_id = state
                .accounts
                .get(username)
                .map(|account| account.user_id.clone())
                .expect("MockIdentityProvider: unknown account");
            state.current = Some(AuthUser::new(user_id, username));
        }
        self
    }

    /// Code accepted for every confirmation, challenge and reset.
    pub fn with_verification_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Password sign-in additionally requires an emailed one-time code.
    pub fn with_email_code_challenge(mut self) -> Self {
        self.require_email_code = true;
        self
    }

    /// Sign-up completes without a confirmation code.
    pub fn with_auto_confirm(mut self) -> Self {
        self.auto_confirm = true;
        self
    }

    /// Emits identity events on `hub`.
    pub fn with_event_hub(mut self, hub: Arc<InMemoryAuthHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Forces every call to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        self.set_error(error);
        self
    }

    pub fn set_error(&self, error: AuthError) {
        *self
            .force_error
            .write()
            .expect("MockIdentityProvider: error lock poisoned") = Some(error);
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .expect("MockIdentityProvider: error lock poisoned") = None;
    }

    // === Test Helpers ===

    pub fn signed_in_user(&self) -> Option<AuthUser> {
        self.read_state().current.clone()
    }

    pub fn account_exists(&self, username: &str) -> bool {
        self.read_state().accounts.contains_key(username)
    }

    pub fn is_confirmed(&self, username: &str) -> bool {
        self.read_state()
            .accounts
            .get(username)
            .is_some_and(|account| account.confirmed)
    }

    /// Signs `username` in behind the session's back, as a second tab would.
    pub async fn sign_in_externally(&self, username: &str) -> Result<AuthUser, AuthError> {
        let user = {
            let mut state = self.lock_state();
            let account = state.accounts.get(username).ok_or(AuthError::UserNotFound)?;
            let user = AuthUser::new(account.user_id.clone(), username);
            state.current = Some(user.clone());
            user
        };
        self.emit(AuthEvent::SignedIn).await;
        Ok(user)
    }

    fn lock_state(&self) -> std::sync::RwLockWriteGuard<'_, MockState> {
        self.state
            .write()
            .expect("MockIdentityProvider: state lock poisoned")
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, MockState> {
        self.state
            .read()
            .expect("MockIdentityProvider: state lock poisoned")
    }

    fn check_forced_error(&self) -> Result<(), AuthError> {
        match self
            .force_error
            .read()
            .expect("MockIdentityProvider: error lock poisoned")
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn emit(&self, event: AuthEvent) {
        if let Some(hub) = &self.hub {
            hub.publish(event).await;
        }
    }

    fn email_code_step(&self, kind: NextStepKind, username: &str) -> NextStep {
        NextStep::new(kind).with_code_delivery(CodeDeliveryDetails {
            destination: mask_email(username),
            medium: DeliveryMedium::Email,
        })
    }
}

/// `mira@example.com` -> `m***@example.com`
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

fn check_password_policy(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidPassword(format!(
            "Password must have length greater than or equal to {}",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpResult, AuthError> {
        self.check_forced_error()?;
        check_password_policy(request.password.expose_secret())?;

        let (user_id, signed_in) = {
            let mut state = self.lock_state();
            if state.accounts.contains_key(&request.username) {
                return Err(AuthError::UserAlreadyExists);
            }
            state.next_user += 1;
            let user_id = UserId::new(format!("user-{}", state.next_user))
                .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

            let signed_in = self.auto_confirm && request.auto_sign_in;
            state.accounts.insert(
                request.username.clone(),
                Account {
                    user_id: user_id.clone(),
                    password: request.password.expose_secret().clone(),
                    confirmed: self.auto_confirm,
                    auto_sign_in: request.auto_sign_in,
                },
            );
            if signed_in {
                state.current = Some(AuthUser::new(user_id.clone(), request.username.clone()));
            }
            (user_id, signed_in)
        };

        if self.auto_confirm {
            if signed_in {
                self.emit(AuthEvent::AutoSignedIn).await;
            }
            return Ok(SignUpResult {
                is_sign_up_complete: true,
                user_id: Some(user_id),
                next_step: Some(NextStep::done()),
            });
        }

        Ok(SignUpResult {
            is_sign_up_complete: false,
            user_id: Some(user_id),
            next_step: Some(self.email_code_step(NextStepKind::ConfirmSignUp, &request.username)),
        })
    }

    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &str,
    ) -> Result<SignUpResult, AuthError> {
        self.check_forced_error()?;

        let (user_id, auto_sign_in) = {
            let mut state = self.lock_state();
            let account = state
                .accounts
                .get_mut(username)
                .ok_or(AuthError::UserNotFound)?;
            if confirmation_code.trim() != self.code {
                return Err(AuthError::CodeMismatch);
            }
            account.confirmed = true;
            let confirmed = (account.user_id.clone(), account.auto_sign_in);
            if confirmed.1 {
                state.current = Some(AuthUser::new(confirmed.0.clone(), username));
            }
            confirmed
        };

        let next_step = if auto_sign_in {
            self.emit(AuthEvent::AutoSignedIn).await;
            NextStep::new(NextStepKind::CompleteAutoSignIn)
        } else {
            NextStep::done()
        };

        Ok(SignUpResult {
            is_sign_up_complete: true,
            user_id: Some(user_id),
            next_step: Some(next_step),
        })
    }

    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResult, AuthError> {
        self.check_forced_error()?;

        let signed_in = {
            let mut state = self.lock_state();
            let account = state
                .accounts
                .get(&request.username)
                .cloned()
                .ok_or(AuthError::UserNotFound)?;

            if !account.confirmed {
                return Ok(SignInResult {
                    is_signed_in: false,
                    user: None,
                    next_step: Some(
                        self.email_code_step(NextStepKind::ConfirmSignUp, &request.username),
                    ),
                });
            }

            let needs_code = match &request.password {
                Some(password) => {
                    if password.expose_secret() != &account.password {
                        return Err(AuthError::InvalidCredentials);
                    }
                    self.require_email_code
                        || request.preferred_challenge == Some(ChallengePreference::EmailCode)
                }
                None => true,
            };

            if needs_code {
                state.pending_challenge = Some(request.username.clone());
                None
            } else {
                let user = AuthUser::new(account.user_id, request.username.clone());
                state.current = Some(user.clone());
                Some(user)
            }
        };

        match signed_in {
            Some(user) => {
                self.emit(AuthEvent::SignedIn).await;
                Ok(SignInResult {
                    is_signed_in: true,
                    user: Some(user),
                    next_step: Some(NextStep::done()),
                })
            }
            None => Ok(SignInResult {
                is_signed_in: false,
                user: None,
                next_step: Some(self.email_code_step(
                    NextStepKind::ConfirmSignInWithEmailCode,
                    &request.username,
                )),
            }),
        }
    }

    async fn confirm_sign_in(&self, challenge_response: &str) -> Result<SignInResult, AuthError> {
        self.check_forced_error()?;

        {
            let mut state = self.lock_state();
            let username = state
                .pending_challenge
                .clone()
                .ok_or(AuthError::NotAuthenticated)?;
            if challenge_response.trim() != self.code {
                return Err(AuthError::CodeMismatch);
            }
            let account = state
                .accounts
                .get(&username)
                .cloned()
                .ok_or(AuthError::UserNotFound)?;
            state.pending_challenge = None;
            state.current = Some(AuthUser::new(account.user_id, username));
        }

        self.emit(AuthEvent::SignedIn).await;

        // Like the hosted provider, the confirmation carries no user.
        Ok(SignInResult {
            is_signed_in: true,
            user: None,
            next_step: Some(NextStep::done()),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_forced_error()?;
        {
            let mut state = self.lock_state();
            state.current = None;
            state.pending_challenge = None;
        }
        self.emit(AuthEvent::SignedOut).await;
        Ok(())
    }

    async fn get_current_user(&self) -> Result<AuthUser, AuthError> {
        self.check_forced_error()?;
        self.read_state()
            .current
            .clone()
            .ok_or(AuthError::NotAuthenticated)
    }

    async fn reset_password(&self, username: &str) -> Result<ResetPasswordResult, AuthError> {
        self.check_forced_error()?;

        let mut state = self.lock_state();
        if !state.accounts.contains_key(username) {
            return Err(AuthError::UserNotFound);
        }
        if !state.pending_resets.iter().any(|u| u == username) {
            state.pending_resets.push(username.to_string());
        }

        Ok(ResetPasswordResult {
            is_password_reset: false,
            next_step: Some(self.email_code_step(NextStepKind::ConfirmResetPasswordWithCode, username)),
        })
    }

    async fn confirm_reset_password(
        &self,
        username: &str,
        confirmation_code: &str,
        new_password: SecretString,
    ) -> Result<(), AuthError> {
        self.check_forced_error()?;

        let mut state = self.lock_state();
        if !state.accounts.contains_key(username) {
            return Err(AuthError::UserNotFound);
        }
        if !state.pending_resets.iter().any(|u| u == username) {
            return Err(AuthError::CodeExpired);
        }
        if confirmation_code != self.code {
            return Err(AuthError::CodeMismatch);
        }
        check_password_policy(new_password.expose_secret())?;

        state.pending_resets.retain(|u| u != username);
        if let Some(account) = state.accounts.get_mut(username) {
            account.password = new_password.expose_secret().clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    fn provider() -> MockIdentityProvider {
        MockIdentityProvider::new().with_account("mira@example.com", "correct horse", "user-1")
    }

    fn sign_up_request(username: &str, auto_sign_in: bool) -> SignUpRequest {
        SignUpRequest {
            username: username.to_string(),
            password: secret("long enough"),
            attributes: BTreeMap::new(),
            auto_sign_in,
        }
    }

    #[test]
    fn mask_email_hides_local_part() {
        assert_eq!(mask_email("mira@example.com"), "m***@example.com");
        assert_eq!(mask_email("nope"), "***");
    }

    #[tokio::test]
    async fn password_sign_in_returns_user() {
        let provider = provider();

        let result = provider
            .sign_in(SignInRequest::with_password("mira@example.com", secret("correct horse")))
            .await
            .unwrap();

        assert!(result.is_signed_in);
        assert_eq!(result.user.unwrap().user_id.as_str(), "user-1");
        assert!(provider.signed_in_user().is_some());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let provider = provider();

        let result = provider
            .sign_in(SignInRequest::with_password("mira@example.com", secret("nope")))
            .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let provider = provider();

        let result = provider
            .sign_in(SignInRequest::with_password("ghost@example.com", secret("x")))
            .await;

        assert_eq!(result, Err(AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn email_code_challenge_flow() {
        let provider = provider().with_email_code_challenge();

        let first = provider
            .sign_in(SignInRequest::with_password("mira@example.com", secret("correct horse")))
            .await
            .unwrap();
        assert!(!first.is_signed_in);
        assert!(first.next_step.unwrap().awaits_challenge_response());

        assert_eq!(
            provider.confirm_sign_in("000000").await,
            Err(AuthError::CodeMismatch)
        );

        let second = provider.confirm_sign_in("123456").await.unwrap();
        assert!(second.is_signed_in);
        assert!(second.user.is_none());
        assert_eq!(provider.get_current_user().await.unwrap().username, "mira@example.com");
    }

    #[tokio::test]
    async fn passwordless_sign_in_asks_for_code() {
        let provider = provider();

        let result = provider
            .sign_in(SignInRequest::with_email_code("mira@example.com"))
            .await
            .unwrap();

        assert!(!result.is_signed_in);
        let step = result.next_step.unwrap();
        assert_eq!(step.kind, NextStepKind::ConfirmSignInWithEmailCode);
        assert_eq!(step.code_delivery.unwrap().destination, "m***@example.com");
    }

    #[tokio::test]
    async fn confirm_sign_in_without_pending_challenge_fails() {
        let provider = provider();
        assert_eq!(
            provider.confirm_sign_in("123456").await,
            Err(AuthError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn sign_up_then_confirm_with_auto_sign_in() {
        let hub = Arc::new(InMemoryAuthHub::new());
        let provider = MockIdentityProvider::new().with_event_hub(hub.clone());

        let signed_up = provider
            .sign_up(sign_up_request("new@example.com", true))
            .await
            .unwrap();
        assert!(!signed_up.is_sign_up_complete);
        assert_eq!(signed_up.next_step.unwrap().kind, NextStepKind::ConfirmSignUp);
        assert!(!provider.is_confirmed("new@example.com"));

        let confirmed = provider
            .confirm_sign_up("new@example.com", "123456")
            .await
            .unwrap();

        assert!(confirmed.is_sign_up_complete);
        assert_eq!(
            confirmed.next_step.unwrap().kind,
            NextStepKind::CompleteAutoSignIn
        );
        assert!(provider.signed_in_user().is_some());
        assert!(hub.has_event(AuthEvent::AutoSignedIn));
    }

    #[tokio::test]
    async fn unconfirmed_sign_in_asks_for_confirmation() {
        let provider = MockIdentityProvider::new();
        provider
            .sign_up(sign_up_request("new@example.com", false))
            .await
            .unwrap();

        let result = provider
            .sign_in(SignInRequest::with_password("new@example.com", secret("long enough")))
            .await
            .unwrap();

        assert!(!result.is_signed_in);
        assert_eq!(result.next_step.unwrap().kind, NextStepKind::ConfirmSignUp);
    }

    #[tokio::test]
    async fn auto_confirm_completes_sign_up_immediately() {
        let provider = MockIdentityProvider::new().with_auto_confirm();

        let result = provider
            .sign_up(sign_up_request("new@example.com", true))
            .await
            .unwrap();

        assert!(result.is_sign_up_complete);
        assert_eq!(result.user_id.unwrap().as_str(), "user-1");
        assert!(provider.signed_in_user().is_some());
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let provider = provider();

        let result = provider.sign_up(sign_up_request("mira@example.com", true)).await;

        assert_eq!(result, Err(AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let provider = MockIdentityProvider::new();
        let mut request = sign_up_request("new@example.com", true);
        request.password = secret("short");

        let result = provider.sign_up(request).await;

        assert!(matches!(result, Err(AuthError::InvalidPassword(_))));
        assert!(!provider.account_exists("new@example.com"));
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let provider = provider();

        assert_eq!(
            provider
                .confirm_reset_password("mira@example.com", "123456", secret("new password"))
                .await,
            Err(AuthError::CodeExpired)
        );

        let started = provider.reset_password("mira@example.com").await.unwrap();
        assert_eq!(
            started.next_step.unwrap().kind,
            NextStepKind::ConfirmResetPasswordWithCode
        );

        provider
            .confirm_reset_password("mira@example.com", "123456", secret("new password"))
            .await
            .unwrap();

        let result = provider
            .sign_in(SignInRequest::with_password("mira@example.com", secret("new password")))
            .await
            .unwrap();
        assert!(result.is_signed_in);
    }

    #[tokio::test]
    async fn sign_out_clears_user_and_emits_event() {
        let hub = Arc::new(InMemoryAuthHub::new());
        let provider = provider()
            .with_signed_in("mira@example.com")
            .with_event_hub(hub.clone());

        provider.sign_out().await.unwrap();

        assert_eq!(
            provider.get_current_user().await,
            Err(AuthError::NotAuthenticated)
        );
        assert!(hub.has_event(AuthEvent::SignedOut));
    }

    #[tokio::test]
    async fn forced_error_applies_to_all_calls() {
        let provider = provider().with_error(AuthError::service_unavailable("down"));

        assert!(provider.get_current_user().await.is_err());
        assert!(provider.sign_out().await.is_err());

        provider.clear_error();
        assert_eq!(
            provider.get_current_user().await,
            Err(AuthError::NotAuthenticated)
        );
    }
}
