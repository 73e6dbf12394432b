//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Identity provider implementations
//! - `events` - Identity event hub
//! - `storage` - Collection stores (hosted GraphQL API, in-memory)

pub mod auth;
pub mod events;
pub mod storage;

pub use auth::MockIdentityProvider;
pub use events::InMemoryAuthHub;
pub use storage::{
    AppSyncCollectionStore, AppSyncConfig, DataAuthorization, InMemoryCollectionStore, StoreCalls,
};
