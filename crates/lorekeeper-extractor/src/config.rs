//! Configuration for segmentation and the extraction pipeline

use crate::error::ExtractorError;
use lorekeeper_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Segmenter limits (all lengths in characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Upper bound on a chunk's length
    pub max_chunk_length: usize,

    /// Chunks shorter than this are dropped as noise
    pub min_chunk_length: usize,

    /// Distinct boilerplate keyword hits at which a chunk counts as metadata
    pub metadata_hit_threshold: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: 3_000,
            min_chunk_length: 50,
            metadata_hit_threshold: 3,
        }
    }
}

impl SegmenterConfig {
    /// Default limits with a different maximum chunk length
    pub fn with_max_chunk_length(max_chunk_length: usize) -> Self {
        Self {
            max_chunk_length,
            ..Self::default()
        }
    }

    /// Validate the limits
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_length == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_length must be greater than 0".to_string(),
            ));
        }
        if self.min_chunk_length > self.max_chunk_length {
            return Err(ExtractorError::Config(
                "min_chunk_length cannot exceed max_chunk_length".to_string(),
            ));
        }
        if self.metadata_hit_threshold == 0 {
            return Err(ExtractorError::Config(
                "metadata_hit_threshold must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Pause between consecutive chunk requests (milliseconds)
    pub inter_request_delay_ms: u64,

    /// Chunking limits
    pub segmenter: SegmenterConfig,

    /// Retry policy around each request
    pub retry: RetryPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            inter_request_delay_ms: 500,
            segmenter: SegmenterConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ExtractorConfig {
    /// Same limits with every wait set to zero
    pub fn without_delays(mut self) -> Self {
        self.inter_request_delay_ms = 0;
        self.retry.base_delay_ms = 0;
        self
    }

    /// Inter-request delay as a Duration
    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        self.segmenter.validate()?;
        if self.retry.max_attempts == 0 {
            return Err(ExtractorError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
