//! Default collection reconciliation planning.
//!
//! Pure decision step of the get-or-create-with-deduplication routine. The
//! handler fetches records, asks [`ReconciliationPlan::for_records`] what to
//! do, then performs the store calls.
//!
//! # Invariant
//!
//! After the plan is carried out, at most one collection named with the
//! default name remains for the owner. The survivor is the record with the
//! earliest creation time; equal times keep store list order. Records with a
//! missing or unparseable creation time order as the epoch.

use crate::domain::foundation::{CollectionId, UserId};

use super::{Collection, NewCollection};

/// What reconciliation must do for one owner.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationPlan {
    /// No default collection exists yet.
    Create(NewCollection),

    /// Exactly one default collection exists. Nothing to do.
    Keep { collection_id: CollectionId },

    /// More than one default collection exists.
    Prune {
        survivor: CollectionId,
        /// Later duplicates to delete, in ascending creation order.
        duplicates: Vec<CollectionId>,
    },
}

impl ReconciliationPlan {
    /// Classifies `records` for `owner`.
    ///
    /// Records that explicitly name another owner are ignored. Duplicates
    /// with a blank id are left alone since they cannot be addressed.
    pub fn for_records(records: &[Collection], owner: &UserId, default_name: &str) -> Self {
        let default_name = default_name.trim();

        let mut matches: Vec<&Collection> = records
            .iter()
            .filter(|record| record.may_belong_to(owner))
            .filter(|record| record.name() == default_name)
            .collect();

        match matches.len() {
            0 => ReconciliationPlan::Create(NewCollection::default_for(owner.clone(), default_name)),
            1 => ReconciliationPlan::Keep {
                collection_id: matches[0].id.clone(),
            },
            _ => {
                // Stable sort: equal timestamps keep list order.
                matches.sort_by_key(|record| record.created_at_or_epoch());

                let survivor = matches[0].id.clone();
                let duplicates = matches[1..]
                    .iter()
                    .map(|record| record.id.clone())
                    .filter(|id| !id.is_blank())
                    .collect();

                ReconciliationPlan::Prune {
                    survivor,
                    duplicates,
                }
            }
        }
    }

    /// Number of store mutations the plan will issue.
    pub fn mutation_count(&self) -> usize {
        match self {
            ReconciliationPlan::Create(_) => 1,
            ReconciliationPlan::Keep { .. } => 0,
            ReconciliationPlan::Prune { duplicates, .. } => duplicates.len(),
        }
    }
}
