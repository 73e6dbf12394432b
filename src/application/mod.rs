//! Application layer - Handlers over the ports.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The session manager is the entry point used by the rest of the app; the
//! default collection reconciler runs on every sign-in.

pub mod handlers;

pub use handlers::{
    // Collection handlers
    DefaultCollectionReconciler, PruneFailure, ReconcileError, ReconcileOutcome,
    ReconcilerSettings,
    // Session handlers
    SessionManager, SessionSettings,
};
