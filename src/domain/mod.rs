//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth types, errors)
//! - `collection` - Collection records and the default collection rule
//! - `session` - Observable session state and identity events

pub mod collection;
pub mod foundation;
pub mod session;
