//! Identity adapters.
//!
//! Implementations of the `IdentityProvider` port:
//!
//! - `mock` - In-memory provider that follows the hosted provider's flows

mod mock;

pub use mock::MockIdentityProvider;
