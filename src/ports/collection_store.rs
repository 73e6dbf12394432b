//! Collection store port - remote CRUD over the `Collection` model.
//!
//! The hosted data service is opaque to this crate: it is treated as an
//! asynchronous key-value style API scoped to one model. Adapters translate
//! its transport errors into [`StoreError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::collection::{Collection, NewCollection};
use crate::domain::foundation::{CollectionId, UserId};

/// Parameters for a single list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCollections {
    /// Server-side owner filter. `None` lists without filtering.
    pub owner: Option<UserId>,

    /// Page size.
    pub limit: u32,
}

impl ListCollections {
    /// Lists the first `limit` collections owned by `owner`.
    pub fn owned_by(owner: UserId, limit: u32) -> Self {
        Self {
            owner: Some(owner),
            limit,
        }
    }
}

/// Errors reported by a collection store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out.
    #[error("Collection store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the operation.
    #[error("Collection store rejected the request: {0}")]
    Rejected(String),

    #[error("Collection not found: {0}")]
    NotFound(CollectionId),

    /// The store's answer could not be decoded.
    #[error("Malformed collection store response: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Remote store holding collection records.
///
/// # Contract
///
/// Implementations must:
/// - Honor `limit` as an upper bound on returned records
/// - Apply the owner filter when given, or document that they cannot
/// - Return the created record, with store-assigned `id` and `created_at`
/// - Return `StoreError::NotFound` when deleting an unknown id
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list(&self, query: ListCollections) -> Result<Vec<Collection>, StoreError>;

    async fn create(&self, collection: NewCollection) -> Result<Collection, StoreError>;

    async fn delete(&self, id: &CollectionId) -> Result<(), StoreError>;
}
