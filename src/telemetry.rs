//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Errors that can occur while installing the subscriber
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Tracing subscriber already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the filter: `RUST_LOG` when set, else `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(default_directive).map_err(|source| TelemetryError::InvalidFilter {
        directive: default_directive.to_string(),
        source,
    })
}

/// Installs the global subscriber.
///
/// JSON lines when `json` is set (production), human-readable otherwise.
pub fn init_tracing(log_level: &str, json: bool) -> Result<(), TelemetryError> {
    let filter = env_filter(log_level)?;

    if json {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_is_reported() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }

        let result = env_filter("dreamlog=loudest");

        assert!(matches!(result, Err(TelemetryError::InvalidFilter { .. })));
    }

    #[test]
    fn test_default_directive_parses() {
        assert!(env_filter("info,dreamlog=debug").is_ok());
    }
}
