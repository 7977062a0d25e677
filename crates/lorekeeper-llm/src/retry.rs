//! Retrying caller with linear backoff and cooperative cancellation

use crate::cancel::CancelSignal;
use crate::error::LlmError;
use crate::LlmProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of attempts per request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between attempts (milliseconds)
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Retry policy for transient failures
///
/// The wait before attempt `n + 1` is `base_delay × n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay_ms: base_delay.as_millis() as u64,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

/// Send `prompt` to `provider`, retrying transient failures
///
/// - Transient errors are retried until `max_attempts` calls have been made.
/// - Authentication and other non-transient errors return after one call.
/// - A pause or cancel on `cancel` aborts the in-flight call or the backoff
///   wait and returns [`LlmError::Cancelled`].
pub async fn complete_with_retry<P: LlmProvider>(
    provider: &P,
    prompt: &str,
    policy: &RetryPolicy,
    cancel: &CancelSignal,
) -> Result<String, LlmError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        if cancel.is_signaled() {
            return Err(LlmError::Cancelled);
        }

        debug!("Request attempt {}/{}", attempt, max_attempts);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = provider.complete(prompt) => result,
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(LlmError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_transient_error_retried_up_to_max() {
        let provider = MockProvider::new("ok");
        provider.fail_when("", LlmError::from_status(503, "down"));

        let result =
            complete_with_retry(&provider, "prompt", &fast_policy(4), &CancelSignal::new()).await;

        assert!(matches!(result, Err(LlmError::Server { status: 503, .. })));
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let provider = MockProvider::new("ok");
        provider.fail_next(LlmError::RateLimited);
        provider.fail_next(LlmError::Communication("reset".into()));

        let result =
            complete_with_retry(&provider, "prompt", &fast_policy(3), &CancelSignal::new()).await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_authentication_error_single_attempt() {
        let provider = MockProvider::new("ok");
        provider.fail_when("", LlmError::Authentication("bad key".into()));

        let result =
            complete_with_retry(&provider, "prompt", &fast_policy(5), &CancelSignal::new()).await;

        assert!(matches!(result, Err(LlmError::Authentication(_))));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let provider = MockProvider::new("ok");
        provider.fail_when("", LlmError::from_status(400, "bad request"));

        let result =
            complete_with_retry(&provider, "prompt", &fast_policy(3), &CancelSignal::new()).await;

        assert!(matches!(result, Err(LlmError::Client { status: 400, .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_call() {
        let provider = MockProvider::new("ok");
        let cancel = CancelSignal::new();
        cancel.cancel();

        let result = complete_with_retry(&provider, "prompt", &fast_policy(3), &cancel).await;

        assert_eq!(result, Err(LlmError::Cancelled));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pause_aborts_in_flight_request() {
        let provider = MockProvider::new("ok").with_latency(Duration::from_secs(30));
        let cancel = CancelSignal::new();
        let handle = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.pause();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            complete_with_retry(&provider, "prompt", &fast_policy(3), &cancel),
        )
        .await
        .expect("pause should abort the request");

        assert_eq!(result, Err(LlmError::Cancelled));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff() {
        let provider = MockProvider::new("ok");
        provider.fail_when("", LlmError::RateLimited);
        let cancel = CancelSignal::new();
        let handle = cancel.clone();
        let policy = RetryPolicy::new(3, Duration::from_secs(30));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            complete_with_retry(&provider, "prompt", &policy, &cancel),
        )
        .await
        .expect("cancel should interrupt the backoff");

        assert_eq!(result, Err(LlmError::Cancelled));
        assert_eq!(provider.call_count(), 1);
    }
}
