//! Error types for the Extractor

use lorekeeper_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The text-understanding service failed (after retries)
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The service answered, but not with a JSON array/object
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Operation not allowed in the session's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
