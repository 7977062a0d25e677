//! Lorekeeper LLM Provider Layer
//!
//! Access to a chat-completion style text-understanding service.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted provider for tests
//! - `OpenAiProvider`: OpenAI-compatible chat-completions endpoint
//!
//! Calls go through [`complete_with_retry`], which applies the retry policy and
//! honours a shared [`CancelSignal`].
//!
//! # Examples
//!
//! ```
//! use lorekeeper_llm::{complete_with_retry, CancelSignal, MockProvider, RetryPolicy};
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let provider = MockProvider::new("Hello from LLM!");
//! let reply = runtime
//!     .block_on(complete_with_retry(
//!         &provider,
//!         "prompt",
//!         &RetryPolicy::default(),
//!         &CancelSignal::new(),
//!     ))
//!     .unwrap();
//! assert_eq!(reply, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod cancel;
pub mod error;
pub mod json;
pub mod mock;
pub mod openai;
pub mod retry;

use std::future::Future;

pub use cancel::{CancelIntent, CancelSignal};
pub use error::LlmError;
pub use json::{find_json_array, find_json_object, strip_code_fences};
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use retry::{complete_with_retry, RetryPolicy};

/// A service that answers a single text prompt
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` and return the generated text
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Model identifier, for logs
    fn model_name(&self) -> &str {
        "llm"
    }
}
