//! Collection store adapters.
//!
//! - `appsync` - Hosted GraphQL data API
//! - `in_memory` - Test store with call recording and failure injection

mod appsync;
mod in_memory;

pub use appsync::{AppSyncCollectionStore, AppSyncConfig, DataAuthorization};
pub use in_memory::{InMemoryCollectionStore, StoreCalls};
