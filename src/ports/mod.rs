//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the hosted services. Adapters implement these ports.
//!
//! - `IdentityProvider` - Sign-up, sign-in, challenges, password reset
//! - `AuthEventSource` - Push-style identity events
//! - `CollectionStore` - Remote CRUD over collection records

mod auth_event_source;
mod collection_store;
mod identity_provider;

pub use auth_event_source::{AuthEventHandler, AuthEventSource};
pub use collection_store::{CollectionStore, ListCollections, StoreError};
pub use identity_provider::{
    ChallengePreference, IdentityProvider, ResetPasswordResult, SignInRequest, SignInResult,
    SignUpRequest, SignUpResult,
};
