//! Collection configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::collection::{ReconcilerSettings, DEFAULT_LIST_LIMIT};
use crate::domain::collection::DEFAULT_COLLECTION_NAME;

/// Largest page the data API accepts.
const MAX_LIST_LIMIT: u32 = 1000;

/// Default collection settings
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Name of the collection every user must have exactly one of
    #[serde(default = "default_name")]
    pub default_name: String,

    /// Page size when listing a user's collections
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl CollectionConfig {
    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            default_name: self.default_name.trim().to_string(),
            list_limit: self.list_limit,
        }
    }

    /// Validate collection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_name.trim().is_empty() {
            return Err(ValidationError::EmptyCollectionName);
        }
        if self.list_limit == 0 || self.list_limit > MAX_LIST_LIMIT {
            return Err(ValidationError::InvalidListLimit {
                max: MAX_LIST_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            default_name: default_name(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}
