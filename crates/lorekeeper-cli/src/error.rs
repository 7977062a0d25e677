//! Error types for the CLI application.

use crate::document::DocumentError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Text-understanding service error
    #[error(transparent)]
    Llm(#[from] lorekeeper_llm::LlmError),

    /// Extraction error
    #[error(transparent)]
    Extractor(#[from] lorekeeper_extractor::ExtractorError),

    /// Merge error
    #[error(transparent)]
    Curator(#[from] lorekeeper_curator::CuratorError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] lorekeeper_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// No API key from flag, environment or profile
    #[error("No API key configured. Set LOREKEEPER_API_KEY or run 'profile set --key'.")]
    MissingApiKey,
}
