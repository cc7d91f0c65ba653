//! Cooperative cancellation for long-running backend requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag the caller raises to abandon an in-flight operation.
///
/// Clones observe the same flag. Cancellation is cooperative: the API
/// client checks the token between request phases and retry attempts, and
/// the progress ticker stops on its next poll. Local state (selected file,
/// previous results) is never touched by cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
