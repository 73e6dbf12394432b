//! Session module - signed-in state, identity events and session errors.

mod errors;
mod events;
mod state;

pub use errors::SessionError;
pub use events::AuthEvent;
pub use state::SessionState;
