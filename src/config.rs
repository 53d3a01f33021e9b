//! Configuration structures for the swatch_gradient engine.
//!
//! This module defines all tunable parameters, organized into groups for
//! the catalog, the match cache, and gradient interpolation. Every field
//! defaults to the values in [`crate::constants`].
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use swatch_gradient::EngineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = EngineConfig::from_json_file(Path::new("engine.json"))?;
//!
//! // Or use defaults
//! let config = EngineConfig::default();
//! # Ok::<(), swatch_gradient::ConfigError>(())
//! ```
//!
//! Missing sections and fields fall back to their defaults, so a file only
//! needs to name what it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::RetryPolicy;
use crate::constants::{cache, catalog, gradient};
use crate::error::ConfigError;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub gradient: GradientConfig,
}

/// Where the catalog comes from and how hard to try
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON feed endpoint; the default is a placeholder that must be replaced
    pub api_url: String,

    /// User agent sent with each request
    pub user_agent: String,

    /// Location of the persisted snapshot
    pub snapshot_path: PathBuf,

    /// Snapshot age that triggers a remote refresh, in seconds
    pub freshness_window_secs: u64,

    /// Connect and read timeout, in seconds
    pub timeout_secs: u64,

    /// Total fetch attempts
    pub retry_attempts: u32,

    /// Pause between attempts, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: catalog::PLACEHOLDER_API_URL.to_string(),
            user_agent: catalog::USER_AGENT.to_string(),
            snapshot_path: PathBuf::from("data").join(catalog::SNAPSHOT_FILE),
            freshness_window_secs: catalog::FRESHNESS_WINDOW.as_secs(),
            timeout_secs: catalog::FETCH_TIMEOUT.as_secs(),
            retry_attempts: catalog::RETRY_ATTEMPTS,
            retry_delay_ms: u64::try_from(catalog::RETRY_DELAY.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl CatalogConfig {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    /// Whether `api_url` is still the built-in placeholder
    pub fn uses_placeholder_endpoint(&self) -> bool {
        self.api_url == catalog::PLACEHOLDER_API_URL
    }
}

/// Match cache bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Distinct query colors kept at once
    pub capacity: usize,

    /// Entry lifetime from insertion, in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: cache::CAPACITY,
            ttl_secs: cache::TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Gradient interpolation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Minimum seed count for a configuration to be valid
    pub min_seeds: usize,

    /// Grid distance below which a cell counts as a seed's own position
    pub coincidence_epsilon: f64,

    /// Bias in the weight 1 / (d² + bias)
    pub weight_bias: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            min_seeds: gradient::MIN_SEEDS,
            coincidence_epsilon: gradient::COINCIDENCE_EPSILON,
            weight_bias: gradient::WEIGHT_BIAS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        log::info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.catalog.timeout(), catalog::FETCH_TIMEOUT);
        assert_eq!(config.catalog.freshness_window(), catalog::FRESHNESS_WINDOW);
        assert_eq!(config.catalog.retry_policy(), RetryPolicy::default());
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.cache.ttl(), cache::TTL);
        assert_eq!(config.gradient.weight_bias, 0.1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "cache": { "capacity": 32 } }"#).unwrap();
        assert_eq!(config.cache.capacity, 32);
        assert_eq!(config.cache.ttl_secs, cache::TTL.as_secs());
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut config = EngineConfig::default();
        config.catalog.api_url = "http://localhost:8080/blocks.json".to_string();
        config.gradient.min_seeds = 3;
        config.to_json_file(&path).unwrap();

        let loaded = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_endpoint_is_a_reserved_placeholder() {
        let mut config = CatalogConfig::default();
        assert!(config.uses_placeholder_endpoint());
        assert!(config.api_url.contains(".invalid/"));

        config.api_url = "https://feeds.example.org/blocks.json".to_string();
        assert!(!config.uses_placeholder_endpoint());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = EngineConfig::from_json_file(Path::new("/nonexistent/engine.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
