//! DefaultCollectionReconciler - ensures every user owns exactly one
//! default collection.
//!
//! One pass issues one `list` call followed by zero or more `create` /
//! `delete` calls. Nothing is locked: two concurrent first sign-ins may
//! both create, and the next pass prunes the later record.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use crate::domain::collection::{Collection, ReconciliationPlan, DEFAULT_COLLECTION_NAME};
use crate::domain::foundation::{CollectionId, UserId};
use crate::ports::{CollectionStore, ListCollections, StoreError};

/// Page size of the single list call.
pub const DEFAULT_LIST_LIMIT: u32 = 200;

/// Tunables for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Reserved name of the default collection.
    pub default_name: String,

    /// Page size of the list call.
    pub list_limit: u32,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_COLLECTION_NAME.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Result of a successful reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// No user id was given. No store calls were made.
    Skipped,

    /// The default collection was missing and has been created.
    Created(Collection),

    /// Exactly one default collection already existed.
    AlreadySatisfied { collection_id: CollectionId },

    /// Duplicates were found and deleted.
    Pruned {
        survivor: CollectionId,
        deleted: Vec<CollectionId>,
    },
}

/// A duplicate that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneFailure {
    pub collection_id: CollectionId,
    pub error: StoreError,
}

/// Errors from a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Failed to list collections: {0}")]
    List(#[source] StoreError),

    #[error("Failed to create default collection: {0}")]
    Create(#[source] StoreError),

    /// Some duplicates could not be deleted. Every duplicate was attempted.
    #[error("Failed to delete {} duplicate default collections ({} deleted)", .failures.len(), .deleted.len())]
    Prune {
        survivor: CollectionId,
        deleted: Vec<CollectionId>,
        failures: Vec<PruneFailure>,
    },
}

/// Reconciles the default collection of one user at a time.
///
/// Holds no state between calls, so it is safe to call repeatedly and
/// concurrently.
pub struct DefaultCollectionReconciler {
    store: Arc<dyn CollectionStore>,
    settings: ReconcilerSettings,
}

impl DefaultCollectionReconciler {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self::with_settings(store, ReconcilerSettings::default())
    }

    pub fn with_settings(store: Arc<dyn CollectionStore>, settings: ReconcilerSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    /// Ensures `user_id` owns exactly one default collection.
    ///
    /// An empty `user_id` is a no-op. Store failures are returned to the
    /// caller, who decides whether to ignore them.
    pub async fn ensure_default_collection(
        &self,
        user_id: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let Ok(owner) = UserId::new(user_id) else {
            return Ok(ReconcileOutcome::Skipped);
        };

        let records = self
            .store
            .list(ListCollections::owned_by(owner.clone(), self.settings.list_limit))
            .await
            .map_err(ReconcileError::List)?;

        match ReconciliationPlan::for_records(&records, &owner, &self.settings.default_name) {
            ReconciliationPlan::Create(payload) => {
                let created = self
                    .store
                    .create(payload)
                    .await
                    .map_err(ReconcileError::Create)?;
                tracing::info!(user_id = %owner, collection_id = %created.id, "Created default collection");
                Ok(ReconcileOutcome::Created(created))
            }
            ReconciliationPlan::Keep { collection_id } => {
                tracing::debug!(user_id = %owner, %collection_id, "Default collection present");
                Ok(ReconcileOutcome::AlreadySatisfied { collection_id })
            }
            ReconciliationPlan::Prune {
                survivor,
                duplicates,
            } => self.prune(&owner, survivor, duplicates).await,
        }
    }

    /// Deletes every duplicate, continuing past individual failures.
    async fn prune(
        &self,
        owner: &UserId,
        survivor: CollectionId,
        duplicates: Vec<CollectionId>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let results = join_all(duplicates.iter().map(|id| self.store.delete(id))).await;

        let mut deleted = Vec::new();
        let mut failures = Vec::new();
        for (collection_id, result) in duplicates.into_iter().zip(results) {
            match result {
                Ok(()) => deleted.push(collection_id),
                Err(error) => {
                    tracing::warn!(user_id = %owner, %collection_id, "Failed to delete duplicate default collection: {}", error);
                    failures.push(PruneFailure {
                        collection_id,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            user_id = %owner,
            %survivor,
            deleted = deleted.len(),
            failed = failures.len(),
            "Pruned duplicate default collections"
        );

        if failures.is_empty() {
            Ok(ReconcileOutcome::Pruned { survivor, deleted })
        } else {
            Err(ReconcileError::Prune {
                survivor,
                deleted,
                failures,
            })
        }
    }
}
