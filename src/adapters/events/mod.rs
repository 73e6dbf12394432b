//! Identity event adapters.
//!
//! - `InMemoryAuthHub` - In-process fan-out of identity events

mod in_memory;

pub use in_memory::InMemoryAuthHub;
