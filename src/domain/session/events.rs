//! Identity events.
//!
//! Pushed by the identity provider whenever the session changes outside a
//! direct call, e.g. a token refresh or an auto sign-in after confirmation.

use serde::{Deserialize, Serialize};

/// Session change notification from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    AutoSignedIn,
    UserDeleted,
}

impl AuthEvent {
    /// Event name as the identity provider emits it.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn => "signedIn",
            AuthEvent::SignedOut => "signedOut",
            AuthEvent::TokenRefreshed => "tokenRefresh",
            AuthEvent::AutoSignedIn => "autoSignIn",
            AuthEvent::UserDeleted => "userDeleted",
        }
    }

    /// Parses a provider event name. Unknown names return `None` and are
    /// ignored by listeners.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "signedIn" => Some(AuthEvent::SignedIn),
            "signedOut" => Some(AuthEvent::SignedOut),
            "tokenRefresh" | "tokenRefreshed" => Some(AuthEvent::TokenRefreshed),
            "autoSignIn" | "autoSignedIn" => Some(AuthEvent::AutoSignedIn),
            "userDeleted" => Some(AuthEvent::UserDeleted),
            _ => None,
        }
    }

    /// True for events after which a user is (still) signed in.
    pub fn implies_signed_in(&self) -> bool {
        matches!(
            self,
            AuthEvent::SignedIn | AuthEvent::AutoSignedIn | AuthEvent::TokenRefreshed
        )
    }
}
