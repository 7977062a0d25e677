//! Configuration for duplicate detection and merging

use crate::error::CuratorError;
use lorekeeper_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the curator
///
/// # Examples
///
/// ```
/// use lorekeeper_curator::CuratorConfig;
///
/// let config = CuratorConfig::default();
/// assert_eq!(config.min_canonical_length, 2);
/// assert_eq!(config.batch_delay_ms, 2_000);
/// assert!(!config.delete_originals);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Canonical names shorter than this (in characters) are never grouped
    pub min_canonical_length: usize,

    /// Pause between consecutive merge requests in a batch (milliseconds)
    pub batch_delay_ms: u64,

    /// Remove the original entries after a successful merge
    pub delete_originals: bool,

    /// Retry policy around each merge request
    pub retry: RetryPolicy,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            min_canonical_length: 2,
            batch_delay_ms: 2_000,
            delete_originals: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl CuratorConfig {
    /// Same settings with every wait set to zero
    pub fn without_delays(mut self) -> Self {
        self.batch_delay_ms = 0;
        self.retry.base_delay_ms = 0;
        self
    }

    /// Batch delay as a Duration
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CuratorError> {
        if self.min_canonical_length == 0 {
            return Err(CuratorError::Config(
                "min_canonical_length must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(CuratorError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, CuratorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CuratorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, CuratorError> {
        toml::to_string_pretty(self)
            .map_err(|e| CuratorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
