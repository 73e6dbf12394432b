//! Collection handlers.

mod ensure_default_collection;

pub use ensure_default_collection::{
    DefaultCollectionReconciler, PruneFailure, ReconcileError, ReconcileOutcome,
    ReconcilerSettings, DEFAULT_LIST_LIMIT,
};
