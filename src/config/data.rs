//! Data API configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::environment::Environment;
use super::error::ValidationError;
use super::outputs::BackendOutputs;
use crate::adapters::{AppSyncConfig, DataAuthorization};

/// Hosted GraphQL data API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// GraphQL endpoint URL
    pub endpoint: Option<String>,

    /// Public API key for the data API
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl DataConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fills endpoint and API key from backend outputs where not set.
    ///
    /// Values from the environment win.
    pub fn with_outputs(mut self, outputs: &BackendOutputs) -> Self {
        if self.endpoint.is_none() {
            self.endpoint = outputs.data.url.clone();
        }
        if self.api_key.is_none() {
            self.api_key = outputs.data.api_key.clone().map(SecretString::new);
        }
        self
    }

    /// Builds the data adapter configuration.
    ///
    /// Both the endpoint and the API key must be present.
    pub fn store_config(&self) -> Result<AppSyncConfig, ValidationError> {
        let endpoint = self
            .endpoint
            .clone()
            .ok_or(ValidationError::MissingRequired("DATA__ENDPOINT"))?;
        let api_key = self
            .api_key
            .clone()
            .ok_or(ValidationError::MissingRequired("DATA__API_KEY"))?;

        Ok(AppSyncConfig::new(endpoint, DataAuthorization::ApiKey(api_key))
            .with_timeout(self.request_timeout()))
    }

    /// Validate data configuration
    ///
    /// An unset endpoint is allowed here; it may come from backend outputs.
    /// In production the endpoint must use HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        if let Some(endpoint) = &self.endpoint {
            let url =
                reqwest::Url::parse(endpoint).map_err(|_| ValidationError::InvalidEndpoint)?;
            match url.scheme() {
                "https" => {}
                "http" if !environment.is_production() => {}
                "http" => return Err(ValidationError::EndpointMustBeHttps),
                _ => return Err(ValidationError::InvalidEndpoint),
            }
        }

        Ok(())
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::outputs::{AuthOutputs, DataOutputs};
    use secrecy::ExposeSecret;

    fn with_endpoint(endpoint: &str) -> DataConfig {
        DataConfig {
            endpoint: Some(endpoint.to_string()),
            api_key: Some(SecretString::new("da2-key".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_data_config_defaults() {
        let config = DataConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_validation_accepts_http_outside_production() {
        let config = with_endpoint("http://localhost:20002/graphql");
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_validation_requires_https_in_production() {
        let config = with_endpoint("http://example.com/graphql");
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::EndpointMustBeHttps)
        );

        let config = with_endpoint("https://example.appsync-api.eu-west-1.amazonaws.com/graphql");
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        assert_eq!(
            with_endpoint("not a url").validate(&Environment::Development),
            Err(ValidationError::InvalidEndpoint)
        );
        assert_eq!(
            with_endpoint("ftp://example.com").validate(&Environment::Development),
            Err(ValidationError::InvalidEndpoint)
        );
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = DataConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidTimeout)
        );
    }

    #[test]
    fn test_store_config_requires_endpoint_and_key() {
        let config = DataConfig::default();
        assert_eq!(
            config.store_config().unwrap_err(),
            ValidationError::MissingRequired("DATA__ENDPOINT")
        );

        let config = DataConfig {
            endpoint: Some("https://example.com/graphql".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.store_config().unwrap_err(),
            ValidationError::MissingRequired("DATA__API_KEY")
        );
    }

    #[test]
    fn test_store_config_uses_api_key_and_timeout() {
        let store = with_endpoint("https://example.com/graphql")
            .store_config()
            .unwrap();

        assert_eq!(store.endpoint, "https://example.com/graphql");
        assert_eq!(store.timeout, Some(Duration::from_secs(10)));
        match store.authorization {
            DataAuthorization::ApiKey(key) => assert_eq!(key.expose_secret(), "da2-key"),
            other => panic!("unexpected authorization: {:?}", other),
        }
    }

    #[test]
    fn test_outputs_fill_missing_values_only() {
        let outputs = BackendOutputs {
            data: DataOutputs {
                url: Some("https://from-outputs.example.com/graphql".to_string()),
                api_key: Some("da2-outputs".to_string()),
                aws_region: Some("eu-west-1".to_string()),
            },
            auth: AuthOutputs::default(),
        };

        let filled = DataConfig::default().with_outputs(&outputs);
        assert_eq!(
            filled.endpoint.as_deref(),
            Some("https://from-outputs.example.com/graphql")
        );
        assert_eq!(filled.api_key.unwrap().expose_secret(), "da2-outputs");

        let kept = with_endpoint("https://env.example.com/graphql").with_outputs(&outputs);
        assert_eq!(kept.endpoint.as_deref(), Some("https://env.example.com/graphql"));
        assert_eq!(kept.api_key.unwrap().expose_secret(), "da2-key");
    }
}
