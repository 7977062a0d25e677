//! Error taxonomy for calls to the text-understanding service

use thiserror::Error;

/// Errors that can occur during LLM operations
///
/// The variants encode the retry classification: see [`LlmError::is_retryable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Credentials were rejected (HTTP 401); never retried
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Server-side failure (HTTP 5xx)
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Request rejected for any other client-side reason (HTTP 4xx)
    #[error("Request rejected (HTTP {status}): {message}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Network or transport failure (connection refused, timeout, reset)
    #[error("Communication error: {0}")]
    Communication(String),

    /// The response envelope could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The caller paused or cancelled while the request was pending
    #[error("Request cancelled")]
    Cancelled,
}

impl LlmError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 => LlmError::Authentication(message),
            429 => LlmError::RateLimited,
            500..=599 => LlmError::Server { status, message },
            _ => LlmError::Client { status, message },
        }
    }

    /// Whether a retry may succeed
    ///
    /// Only rate limiting, server errors and transport failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited | LlmError::Server { .. } | LlmError::Communication(_)
        )
    }

    /// Whether this is a cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LlmError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(LlmError::from_status(401, "no"), LlmError::Authentication(_)));
        assert_eq!(LlmError::from_status(429, ""), LlmError::RateLimited);
        assert!(matches!(LlmError::from_status(503, ""), LlmError::Server { status: 503, .. }));
        assert!(matches!(LlmError::from_status(400, ""), LlmError::Client { status: 400, .. }));
        assert!(matches!(LlmError::from_status(403, ""), LlmError::Client { status: 403, .. }));
    }

    #[test]
    fn test_retryable_classes() {
        assert!(LlmError::RateLimited.is_retryable());
        assert!(LlmError::from_status(500, "").is_retryable());
        assert!(LlmError::Communication("reset".into()).is_retryable());

        assert!(!LlmError::Authentication("bad key".into()).is_retryable());
        assert!(!LlmError::from_status(404, "").is_retryable());
        assert!(!LlmError::InvalidResponse("html".into()).is_retryable());
        assert!(!LlmError::Cancelled.is_retryable());
    }
}
