//! Application handlers.
//!
//! Handlers that orchestrate domain operations over the ports.

pub mod collection;
pub mod session;

pub use collection::{
    DefaultCollectionReconciler, PruneFailure, ReconcileError, ReconcileOutcome,
    ReconcilerSettings, DEFAULT_LIST_LIMIT,
};
pub use session::{SessionManager, SessionSettings};
