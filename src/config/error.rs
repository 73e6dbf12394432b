//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Failed to read backend outputs {path}: {source}")]
    OutputsUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed backend outputs {path}: {source}")]
    OutputsMalformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid data endpoint URL")]
    InvalidEndpoint,

    #[error("Data endpoint must use HTTPS in production")]
    EndpointMustBeHttps,

    #[error("Default collection name cannot be empty")]
    EmptyCollectionName,

    #[error("Collection list limit must be between 1 and {max}")]
    InvalidListLimit { max: u32 },
}
