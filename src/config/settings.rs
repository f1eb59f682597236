//! # Configuration Settings
//!
//! Defines the configuration structure for the certplane certificate store
//! and reconciliation engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::reconcile::DestinationKind;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Certificate store configuration
    #[validate(nested)]
    pub store: StoreConfig,

    /// Reconciliation engine configuration
    #[validate(nested)]
    pub engine: EngineConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Destination name to destination configuration
    #[serde(default)]
    pub destinations: BTreeMap<String, DestinationConfig>,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        // Use validator crate for basic validation
        Validate::validate(self).map_err(Error::from)?;

        // Custom validation logic
        self.validate_custom()?;

        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if self.store.root.as_os_str().is_empty() {
            return Err(Error::validation("Store root cannot be empty"));
        }

        for (name, destination) in &self.destinations {
            if name.is_empty() {
                return Err(Error::validation("Destination name cannot be empty"));
            }
            destination.validate().map_err(Error::from)?;

            let url = Url::parse(&destination.base_url).map_err(|err| {
                Error::validation_field(
                    format!("Destination '{}' base URL is invalid: {}", name, err),
                    "base_url",
                )
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::validation_field(
                    format!("Destination '{}' base URL must use http or https", name),
                    "base_url",
                ));
            }
        }

        Ok(())
    }

    /// Create configuration from environment variables
    ///
    /// Reads `CERTPLANE_STORE_ROOT`, the engine timeout variables, the
    /// logging variables, and optionally `CERTPLANE_DESTINATIONS_FILE`
    /// (a YAML mapping of destination name to destination configuration).
    pub fn from_env() -> Result<Self> {
        let destinations = match std::env::var("CERTPLANE_DESTINATIONS_FILE") {
            Ok(path) => Self::load_destinations_file(Path::new(&path))?,
            Err(_) => BTreeMap::new(),
        };

        let config = Self {
            store: StoreConfig::from_env(),
            engine: EngineConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
            destinations,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the destination inventory from a YAML file
    pub fn load_destinations_file(path: &Path) -> Result<BTreeMap<String, DestinationConfig>> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::io(err, format!("reading destinations file {}", path.display()))
        })?;
        let destinations = serde_yaml::from_str(&raw)?;
        Ok(destinations)
    }

    /// Runtime destination set for one destination family
    pub fn destinations_for(&self, kind: DestinationKind) -> Vec<Destination> {
        self.destinations
            .iter()
            .filter(|(_, destination)| destination.kind == kind)
            .map(|(name, destination)| Destination::new(name, &destination.base_url))
            .collect()
    }
}

/// Certificate store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Directory holding the certificate archive blobs
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("./data/certs") }
    }
}

impl StoreConfig {
    /// Create StoreConfig from environment variables
    pub fn from_env() -> Self {
        let root = std::env::var("CERTPLANE_STORE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/certs"));

        Self { root }
    }
}

/// Reconciliation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    /// Connectivity probe timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Probe timeout must be between 1 and 300 seconds"
    ))]
    pub probe_timeout_seconds: u64,

    /// Inventory listing timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Listing timeout must be between 1 and 300 seconds"
    ))]
    pub listing_timeout_seconds: u64,

    /// Detail fetch and install timeout in seconds
    #[validate(range(
        min = 1,
        max = 300,
        message = "Call timeout must be between 1 and 300 seconds"
    ))]
    pub call_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { probe_timeout_seconds: 3, listing_timeout_seconds: 10, call_timeout_seconds: 30 }
    }
}

impl EngineConfig {
    /// Get connectivity probe timeout as Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// Get inventory listing timeout as Duration
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_seconds)
    }

    /// Get detail fetch and install timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }

    /// Create EngineConfig from environment variables
    pub fn from_env() -> Self {
        let probe_timeout_seconds = std::env::var("CERTPLANE_PROBE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3);

        let listing_timeout_seconds = std::env::var("CERTPLANE_LISTING_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let call_timeout_seconds = std::env::var("CERTPLANE_CALL_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        Self { probe_timeout_seconds, listing_timeout_seconds, call_timeout_seconds }
    }
}

/// Observability configuration for structured logging
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "certplane".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("CERTPLANE_SERVICE_NAME").unwrap_or_else(|_| "certplane".to_string());

        let log_level =
            std::env::var("CERTPLANE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let json_logging = std::env::var("CERTPLANE_JSON_LOGGING")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Self { service_name, log_level, json_logging }
    }
}

/// Configuration for one reconciliation destination
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DestinationConfig {
    /// Destination family handling this destination
    pub kind: DestinationKind,

    /// Base URL of the destination API
    #[validate(length(min = 1, message = "Base URL cannot be empty"))]
    pub base_url: String,
}

/// Runtime destination value handed to the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Destination name, unique within the configuration
    pub name: String,
    /// Base URL of the destination API
    pub base_url: String,
}

impl Destination {
    /// Create a new destination
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self { name: name.into(), base_url: base_url.into() }
    }

    /// Compose the full URL for a destination-relative path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::Mutex;

    use super::*;

    // Use a mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 8] = [
        "CERTPLANE_STORE_ROOT",
        "CERTPLANE_PROBE_TIMEOUT_SECONDS",
        "CERTPLANE_LISTING_TIMEOUT_SECONDS",
        "CERTPLANE_CALL_TIMEOUT_SECONDS",
        "CERTPLANE_SERVICE_NAME",
        "CERTPLANE_LOG_LEVEL",
        "CERTPLANE_JSON_LOGGING",
        "CERTPLANE_DESTINATIONS_FILE",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_timeouts() {
        let config = EngineConfig::default();
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.listing_timeout(), Duration::from_secs(10));
        assert_eq!(config.call_timeout(), Duration::from_secs(30));

        let config = EngineConfig { probe_timeout_seconds: 5, ..Default::default() };
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_engine_config_range_validation() {
        let mut config = AppConfig::default();
        config.engine.probe_timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.engine.listing_timeout_seconds = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_root_validation() {
        let mut config = AppConfig::default();
        config.store.root = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_destination_base_url_validation() {
        let mut config = AppConfig::default();
        config.destinations.insert(
            "lb-east".to_string(),
            DestinationConfig {
                kind: DestinationKind::ServerKeys,
                base_url: "ftp://lb-east.example.com".to_string(),
            },
        );
        assert!(config.validate().is_err());

        config.destinations.insert(
            "lb-east".to_string(),
            DestinationConfig {
                kind: DestinationKind::ServerKeys,
                base_url: "https://lb-east.example.com/api/tm/7.1/config/active".to_string(),
            },
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_destinations_for_filters_by_kind() {
        let mut config = AppConfig::default();
        config.destinations.insert(
            "lb-east".to_string(),
            DestinationConfig {
                kind: DestinationKind::ServerKeys,
                base_url: "https://lb-east.example.com".to_string(),
            },
        );
        config.destinations.insert(
            "lb-west".to_string(),
            DestinationConfig {
                kind: DestinationKind::ServerKeys,
                base_url: "https://lb-west.example.com".to_string(),
            },
        );

        let destinations = config.destinations_for(DestinationKind::ServerKeys);
        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].name, "lb-east");
        assert_eq!(destinations[1].name, "lb-west");
    }

    #[test]
    fn test_destination_url_composition() {
        let destination = Destination::new("lb-east", "https://lb-east.example.com/api");
        assert_eq!(
            destination.url_for("ssl/server_keys/"),
            "https://lb-east.example.com/api/ssl/server_keys/"
        );

        let destination = Destination::new("lb-east", "https://lb-east.example.com/api/");
        assert_eq!(
            destination.url_for("/ssl/server_keys/www.example.com"),
            "https://lb-east.example.com/api/ssl/server_keys/www.example.com"
        );

        assert_eq!(destination.url_for(""), "https://lb-east.example.com/api/");
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("destinations.yaml");
        std::fs::write(
            &file,
            "lb-east:\n  kind: server_keys\n  base_url: \"https://lb-east.example.com/api\"\n",
        )
        .unwrap();

        env::set_var("CERTPLANE_STORE_ROOT", "/srv/certplane/certs");
        env::set_var("CERTPLANE_PROBE_TIMEOUT_SECONDS", "5");
        env::set_var("CERTPLANE_LISTING_TIMEOUT_SECONDS", "20");
        env::set_var("CERTPLANE_CALL_TIMEOUT_SECONDS", "60");
        env::set_var("CERTPLANE_SERVICE_NAME", "certplane-staging");
        env::set_var("CERTPLANE_LOG_LEVEL", "debug");
        env::set_var("CERTPLANE_JSON_LOGGING", "true");
        env::set_var("CERTPLANE_DESTINATIONS_FILE", &file);

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.store.root, PathBuf::from("/srv/certplane/certs"));
        assert_eq!(config.engine.probe_timeout_seconds, 5);
        assert_eq!(config.engine.listing_timeout_seconds, 20);
        assert_eq!(config.engine.call_timeout_seconds, 60);
        assert_eq!(config.observability.service_name, "certplane-staging");
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logging);
        assert_eq!(config.destinations.len(), 1);
        assert_eq!(config.destinations["lb-east"].kind, DestinationKind::ServerKeys);
        assert_eq!(config.destinations["lb-east"].base_url, "https://lb-east.example.com/api");

        // Clean up
        clear_env();
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();

        // Ensure no env vars are set
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.store.root, PathBuf::from("./data/certs"));
        assert_eq!(config.engine.probe_timeout_seconds, 3);
        assert_eq!(config.engine.listing_timeout_seconds, 10);
        assert_eq!(config.engine.call_timeout_seconds, 30);
        assert_eq!(config.observability.service_name, "certplane");
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logging);
        assert!(config.destinations.is_empty());
    }

    #[test]
    fn test_config_from_env_missing_destinations_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        env::set_var("CERTPLANE_DESTINATIONS_FILE", "/nonexistent/destinations.yaml");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/destinations.yaml"));

        // Clean up
        clear_env();
    }

    #[test]
    fn test_load_destinations_file_rejects_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("destinations.yaml");
        std::fs::write(&file, "lb-east:\n  kind: [not\n").unwrap();

        let err = AppConfig::load_destinations_file(&file).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }
}
