//! Cooperative pause/cancel signal shared between a caller and a running job

use std::sync::Arc;
use tokio::sync::watch;

/// What the caller wants the running job to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelIntent {
    /// Stop at the next suspend point and keep a resumable checkpoint
    Pause,

    /// Stop at the next suspend point and discard resumability
    Cancel,
}

/// Cloneable cancellation token
///
/// Every clone observes the same state. Once `cancel()` has been requested a
/// later `pause()` is ignored; a pending pause is upgraded by `cancel()`.
/// A signal is single-use: start each run with a fresh one.
///
/// # Examples
///
/// ```
/// use lorekeeper_llm::{CancelIntent, CancelSignal};
///
/// let signal = CancelSignal::new();
/// let handle = signal.clone();
/// assert_eq!(signal.intent(), None);
///
/// handle.pause();
/// assert_eq!(signal.intent(), Some(CancelIntent::Pause));
///
/// handle.cancel();
/// assert_eq!(signal.intent(), Some(CancelIntent::Cancel));
/// ```
#[derive(Debug, Clone)]
pub struct CancelSignal {
    sender: Arc<watch::Sender<Option<CancelIntent>>>,
}

impl CancelSignal {
    /// Create an unsignaled token
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Request a resumable stop
    pub fn pause(&self) {
        self.request(CancelIntent::Pause);
    }

    /// Request a hard stop
    pub fn cancel(&self) {
        self.request(CancelIntent::Cancel);
    }

    fn request(&self, intent: CancelIntent) {
        self.sender.send_if_modified(|current| match (*current, intent) {
            (Some(CancelIntent::Cancel), _) => false,
            (Some(CancelIntent::Pause), CancelIntent::Pause) => false,
            _ => {
                *current = Some(intent);
                true
            }
        });
    }

    /// The current intent, if any
    pub fn intent(&self) -> Option<CancelIntent> {
        *self.sender.borrow()
    }

    /// Whether any stop has been requested
    pub fn is_signaled(&self) -> bool {
        self.intent().is_some()
    }

    /// Resolve once a stop is requested
    ///
    /// Meant to be raced against a suspend point in `tokio::select!`.
    pub async fn cancelled(&self) -> CancelIntent {
        let mut receiver = self.sender.subscribe();
        loop {
            if let Some(intent) = *receiver.borrow_and_update() {
                return intent;
            }
            if receiver.changed().await.is_err() {
                // The sender lives as long as `self`; this is unreachable in practice.
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
