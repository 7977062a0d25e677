//! Scripted provider for deterministic tests

use crate::{LlmError, LlmProvider};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, String)>,
    failures: VecDeque<LlmError>,
    marker_failures: Vec<(String, LlmError)>,
    prompts: Vec<String>,
}

/// Mock LLM provider
///
/// Returns pre-configured responses without making any network calls. Clones
/// share state, so a test can keep a handle while the pipeline owns another.
///
/// Resolution order for each call:
/// 1. queued one-shot failures (`fail_next`)
/// 2. persistent failures whose marker occurs in the prompt (`fail_when`)
/// 3. responses whose marker occurs in the prompt (`add_response`)
/// 4. the default response
///
/// # Examples
///
/// ```
/// use lorekeeper_llm::MockProvider;
///
/// let provider = MockProvider::new("[]");
/// provider.add_response("Chapter 2", "not json");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    latency: Duration,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            latency: Duration::ZERO,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Answer prompts containing `marker` with `response`
    pub fn add_response(&self, marker: impl Into<String>, response: impl Into<String>) {
        self.lock().rules.push((marker.into(), response.into()));
    }

    /// Fail the next call with `error`
    pub fn fail_next(&self, error: LlmError) {
        self.lock().failures.push_back(error);
    }

    /// Fail every call whose prompt contains `marker`
    ///
    /// An empty marker matches all prompts.
    pub fn fail_when(&self, marker: impl Into<String>, error: LlmError) {
        self.lock().marker_failures.push((marker.into(), error));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        if let Some((_, error)) = state
            .marker_failures
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
        {
            return Err(error.clone());
        }
        let response = state
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());
        Ok(response)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let result = self.respond(prompt);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        result
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
