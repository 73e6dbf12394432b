//! Collection module - per-user data records and the default collection
//! reconciliation rule.

mod reconciliation;
mod record;

pub use reconciliation::ReconciliationPlan;
pub use record::{Collection, CollectionProperty, NewCollection, DEFAULT_COLLECTION_NAME};
