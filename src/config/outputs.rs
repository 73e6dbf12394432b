//! Backend outputs file
//!
//! The hosted backend deploy writes an `amplify_outputs.json` describing
//! the data API and the user pool. Only the fields used here are read;
//! everything else in the file is ignored.

use serde::Deserialize;
use std::path::Path;

use super::error::ConfigError;

/// Parsed backend outputs.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BackendOutputs {
    #[serde(default)]
    pub data: DataOutputs,

    #[serde(default)]
    pub auth: AuthOutputs,
}

/// Data API section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DataOutputs {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub aws_region: Option<String>,
}

/// User pool section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AuthOutputs {
    pub user_pool_id: Option<String>,
    pub user_pool_client_id: Option<String>,
    pub aws_region: Option<String>,
}

impl BackendOutputs {
    /// Reads and parses the outputs file at `path`.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file is `OutputsUnreadable`; invalid JSON is
    /// `OutputsMalformed`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::OutputsUnreadable {
                path: path.display().to_string(),
                source,
            })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::OutputsMalformed {
            path: path.display().to_string(),
            source,
        })
    }
}
