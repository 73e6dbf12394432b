//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DREAMLOG` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use dreamlog::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default collection: {}", config.collections.default_name);
//! ```

mod collections;
mod data;
mod environment;
mod error;
mod outputs;

pub use collections::CollectionConfig;
pub use data::DataConfig;
pub use environment::Environment;
pub use error::{ConfigError, ValidationError};
pub use outputs::{AuthOutputs, BackendOutputs, DataOutputs};

use serde::Deserialize;

use crate::application::handlers::session::SessionSettings;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,

    /// Tracing filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hosted data API
    #[serde(default)]
    pub data: DataConfig,

    /// Default collection settings
    #[serde(default)]
    pub collections: CollectionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DREAMLOG` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DREAMLOG__ENVIRONMENT=production` -> `environment = production`
    /// - `DREAMLOG__DATA__ENDPOINT=...` -> `data.endpoint = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DREAMLOG")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.data.validate(&self.environment)?;
        self.collections.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Session behaviour for this environment.
    ///
    /// Swallowed failures are only logged in development.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            log_suppressed_errors: self.is_development(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            data: DataConfig::default(),
            collections: CollectionConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info,dreamlog=debug".to_string()
}
