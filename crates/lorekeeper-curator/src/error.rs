//! Error types for curation

use lorekeeper_llm::LlmError;
use thiserror::Error;

/// Errors that can occur while finding or merging duplicates
#[derive(Error, Debug)]
pub enum CuratorError {
    /// Text-understanding service error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The merge response held no usable JSON object
    #[error("Malformed merge response: {0}")]
    MalformedResponse(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// The group cannot be merged as given
    #[error("Invalid group: {0}")]
    InvalidGroup(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CuratorError {
    /// Whether this error came from a pause or cancel request
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CuratorError::Llm(e) if e.is_cancellation())
    }
}
