//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the DreamLog session core.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{
    AuthError, AuthUser, CodeDeliveryDetails, DeliveryMedium, NextStep, NextStepKind,
};
pub use errors::ValidationError;
pub use ids::{CollectionId, SubscriptionId, UserId};
pub use timestamp::Timestamp;
