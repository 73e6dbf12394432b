//! Session handlers.
//!
//! [`SessionManager`] owns the observable session state and drives the
//! identity flows; a private listener keeps it in step with identity events.

mod auth_listener;
mod session_manager;

pub use session_manager::{SessionManager, SessionSettings};
