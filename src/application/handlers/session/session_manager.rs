//! SessionManager - identity flows and observable session state.
//!
//! The manager is an explicit context object: the caller creates it at
//! start-up with its collaborators, hands clones to consumers, and calls
//! [`SessionManager::shutdown`] at exit.
//!
//! Every operation marks the state as loading for its duration. Validation
//! and identity errors are stored in the last-error slot and returned.
//! Whenever a user becomes signed in, the default collection is reconciled;
//! reconciliation failures are swallowed so they never block sign-in.
//!
//! # Example
//!
//! ```ignore
//! let session = SessionManager::new(identity, hub, reconciler, SessionSettings::default());
//! session.initialize().await;
//!
//! let mut state = session.subscribe();
//! session.login("mira@example.com", password).await?;
//! assert!(state.borrow_and_update().is_authenticated());
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::application::handlers::collection::DefaultCollectionReconciler;
use crate::domain::foundation::{AuthError, AuthUser, NextStep, SubscriptionId};
use crate::domain::session::{SessionError, SessionState};
use crate::ports::{
    AuthEventSource, IdentityProvider, ResetPasswordResult, SignInRequest, SignInResult,
    SignUpRequest, SignUpResult,
};

use super::auth_listener::SessionAuthListener;

/// Behaviour switches for the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Log swallowed reconciliation and initialization failures. Enabled in
    /// development only.
    pub log_suppressed_errors: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            log_suppressed_errors: true,
        }
    }
}

/// What an operation resets when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reset {
    Nothing,
    Error,
    ErrorAndNextStep,
}

/// Shared core, also reachable from the identity event listener.
pub(super) struct SessionCore {
    identity: Arc<dyn IdentityProvider>,
    reconciler: Arc<DefaultCollectionReconciler>,
    state: watch::Sender<SessionState>,
    settings: SessionSettings,
}

impl SessionCore {
    fn begin(&self, reset: Reset) {
        self.state.send_modify(|state| {
            state.loading = true;
            if reset != Reset::Nothing {
                state.last_error = None;
            }
            if reset == Reset::ErrorAndNextStep {
                state.next_step = None;
            }
        });
    }

    fn finish<T>(&self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        self.state.send_modify(|state| {
            state.loading = false;
            if let Err(error) = &result {
                state.last_error = Some(error.clone());
            }
        });
        result
    }

    pub(super) fn set_user(&self, user: Option<AuthUser>) {
        self.state.send_modify(|state| state.user = user);
    }

    fn set_next_step(&self, next_step: Option<NextStep>) {
        self.state.send_modify(|state| state.next_step = next_step);
    }

    /// Runs reconciliation for `user`, never failing.
    pub(super) async fn reconcile_quietly(&self, user: &AuthUser) {
        match self
            .reconciler
            .ensure_default_collection(user.user_id.as_str())
            .await
        {
            Ok(outcome) => {
                tracing::debug!(user_id = %user.user_id, ?outcome, "Default collection reconciled");
            }
            Err(error) => {
                if self.settings.log_suppressed_errors {
                    tracing::debug!(user_id = %user.user_id, "Default collection reconciliation failed: {}", error);
                }
            }
        }
    }

    /// Re-reads the current user after an identity event.
    pub(super) async fn refresh_signed_in_user(&self) {
        match self.identity.get_current_user().await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                self.reconcile_quietly(&user).await;
            }
            Err(error) => {
                tracing::debug!("Current user unavailable after auth event: {}", error);
                self.set_user(None);
            }
        }
    }

    /// Bookkeeping shared by sign-in and challenge completion.
    async fn apply_sign_in(&self, response: &SignInResult) -> Result<(), SessionError> {
        self.set_next_step(response.next_step.clone());
        if !response.is_signed_in {
            return Ok(());
        }

        let user = match &response.user {
            Some(user) => user.clone(),
            None => self.identity.get_current_user().await?,
        };
        self.set_user(Some(user.clone()));
        self.reconcile_quietly(&user).await;
        Ok(())
    }
}

/// Session context shared by the application.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct SessionManager {
    core: Arc<SessionCore>,
    events: Arc<dyn AuthEventSource>,
    subscription: Arc<Mutex<Option<SubscriptionId>>>,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        events: Arc<dyn AuthEventSource>,
        reconciler: Arc<DefaultCollectionReconciler>,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            core: Arc::new(SessionCore {
                identity,
                reconciler,
                state,
                settings,
            }),
            events,
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    // === Observable state ===

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.core.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.core.state.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.core.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.core.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.core.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.core.state.borrow().last_error.clone()
    }

    pub fn error_message(&self) -> String {
        self.core.state.borrow().error_message()
    }

    pub fn next_step(&self) -> Option<NextStep> {
        self.core.state.borrow().next_step.clone()
    }

    pub fn clear_error(&self) {
        self.core.state.send_modify(|state| state.last_error = None);
    }

    // === Lifecycle ===

    /// Subscribes to identity events. Calling it again is a no-op.
    pub fn start_auth_listener(&self) {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            return;
        }

        let listener = SessionAuthListener::new(Arc::downgrade(&self.core));
        *subscription = Some(self.events.subscribe(Arc::new(listener)));
        tracing::debug!("Auth listener started");
    }

    /// Unsubscribes from identity events.
    pub fn shutdown(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = subscription {
            self.events.unsubscribe(id);
            tracing::debug!("Auth listener stopped");
        }
    }

    /// Restores an existing session at start-up.
    ///
    /// Not being signed in is the normal first-load state, so no failure
    /// here is surfaced.
    pub async fn initialize(&self) -> Option<AuthUser> {
        self.start_auth_listener();
        self.core.begin(Reset::Nothing);

        let user = match self.core.identity.get_current_user().await {
            Ok(user) => {
                self.core.set_user(Some(user.clone()));
                self.core.reconcile_quietly(&user).await;
                Some(user)
            }
            Err(AuthError::NotAuthenticated) => {
                self.core.set_user(None);
                None
            }
            Err(error) => {
                self.core.set_user(None);
                if self.core.settings.log_suppressed_errors {
                    tracing::debug!("Session initialization warning: {}", error);
                }
                None
            }
        };

        self.core.state.send_modify(|state| state.loading = false);
        user
    }

    // === Sign-in ===

    /// Signs in with email and password.
    pub async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<SignInResult, SessionError> {
        self.core.begin(Reset::ErrorAndNextStep);
        let result = self
            .sign_in(move |username| SignInRequest::with_password(username, password), email)
            .await;
        self.core.finish(result)
    }

    /// Starts a passwordless sign-in; the provider emails a one-time code
    /// to be passed to [`SessionManager::complete_sign_in`].
    pub async fn login_with_code(&self, email: &str) -> Result<SignInResult, SessionError> {
        self.core.begin(Reset::ErrorAndNextStep);
        let result = self
            .sign_in(|username| SignInRequest::with_email_code(username), email)
            .await;
        self.core.finish(result)
    }

    async fn sign_in(
        &self,
        request: impl FnOnce(String) -> SignInRequest,
        email: &str,
    ) -> Result<SignInResult, SessionError> {
        let username = normalize_email(email)?;
        let response = self.core.identity.sign_in(request(username)).await?;
        self.core.apply_sign_in(&response).await?;
        Ok(response)
    }

    /// Answers the challenge of a multi-step sign-in.
    ///
    /// A blank response is rejected before any call and, unlike other
    /// failures, is not recorded as the last error.
    pub async fn complete_sign_in(
        &self,
        challenge_response: &str,
    ) -> Result<SignInResult, SessionError> {
        if challenge_response.trim().is_empty() {
            return Err(SessionError::empty_field("challenge_response"));
        }

        self.core.begin(Reset::Error);
        let result = async {
            let response = self.core.identity.confirm_sign_in(challenge_response).await?;
            self.core.apply_sign_in(&response).await?;
            Ok::<_, SessionError>(response)
        }
        .await;
        self.core.finish(result)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.core.begin(Reset::Error);
        let result = async {
            self.core.identity.sign_out().await?;
            self.core.set_user(None);
            Ok::<_, SessionError>(())
        }
        .await;
        self.core.finish(result)
    }

    // === Registration ===

    /// Registers a new account with auto sign-in requested.
    ///
    /// When the provider completes sign-up immediately, the new user is
    /// loaded and reconciled; failure to do so is logged, not surfaced.
    pub async fn register(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<SignUpResult, SessionError> {
        self.start_auth_listener();
        self.core.begin(Reset::ErrorAndNextStep);

        let result = async {
            let username = normalize_email(email)?;
            let attributes = BTreeMap::from([
                ("email".to_string(), username.clone()),
                ("nickname".to_string(), String::new()),
            ]);
            let response = self
                .core
                .identity
                .sign_up(SignUpRequest {
                    username,
                    password,
                    attributes,
                    auto_sign_in: true,
                })
                .await?;

            self.core.set_next_step(response.next_step.clone());

            if response.is_sign_up_complete && response.user_id.is_some() {
                match self.core.identity.get_current_user().await {
                    Ok(user) => {
                        self.core.reconcile_quietly(&user).await;
                        self.core.set_user(Some(user));
                    }
                    Err(error) => {
                        if self.core.settings.log_suppressed_errors {
                            tracing::debug!("Auto sign-in failed after registration: {}", error);
                        }
                    }
                }
            }

            Ok::<_, SessionError>(response)
        }
        .await;
        self.core.finish(result)
    }

    pub async fn confirm_registration(
        &self,
        email: &str,
        confirmation_code: &str,
    ) -> Result<SignUpResult, SessionError> {
        self.core.begin(Reset::Error);
        let result = async {
            let username = normalize_email(email)?;
            let response = self
                .core
                .identity
                .confirm_sign_up(&username, confirmation_code)
                .await?;
            self.core.set_next_step(None);
            Ok::<_, SessionError>(response)
        }
        .await;
        self.core.finish(result)
    }

    // === Password reset ===

    pub async fn initiate_password_reset(
        &self,
        email: &str,
    ) -> Result<ResetPasswordResult, SessionError> {
        self.core.begin(Reset::Error);
        let result = async {
            let username = normalize_email(email)?;
            let response = self.core.identity.reset_password(&username).await?;
            self.core.set_next_step(response.next_step.clone());
            Ok::<_, SessionError>(response)
        }
        .await;
        self.core.finish(result)
    }

    pub async fn complete_password_reset(
        &self,
        email: &str,
        confirmation_code: &str,
        new_password: SecretString,
    ) -> Result<(), SessionError> {
        self.core.begin(Reset::Error);
        let result = async {
            let username = normalize_email(email)?;
            let code = confirmation_code.trim();
            if code.is_empty() {
                return Err(SessionError::empty_field("confirmation_code"));
            }
            if new_password.expose_secret().is_empty() {
                return Err(SessionError::empty_field("new_password"));
            }

            self.core
                .identity
                .confirm_reset_password(&username, code, new_password)
                .await?;
            self.core.set_next_step(None);
            Ok::<_, SessionError>(())
        }
        .await;
        self.core.finish(result)
    }
}

/// Trims the email used as username; empty is a validation error.
fn normalize_email(email: &str) -> Result<String, SessionError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SessionError::empty_field("email"));
    }
    Ok(email.to_string())
}
