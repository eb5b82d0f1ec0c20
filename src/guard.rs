/// Deadline and cancellation wrapper for storage legs
use crate::error::{FeedError, FeedResult};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Per-call limits handed down from the request boundary
#[derive(Debug, Clone)]
pub struct QueryGuard {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl QueryGuard {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// A guard that is never cancelled externally
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, CancellationToken::new())
    }

    /// Guard for a sibling leg: cancelled with the parent, independently cancellable
    pub fn child(&self) -> Self {
        Self::new(self.timeout, self.cancel.child_token())
    }

    /// Run a storage future under this guard.
    ///
    /// On timeout or cancellation the future is dropped, aborting the
    /// in-flight query; its result is never observed.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> FeedResult<T>
    where
        F: Future<Output = FeedResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(FeedError::Cancelled { operation });
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(operation, "Storage operation cancelled");
                Err(FeedError::Cancelled { operation })
            }
            result = tokio::time::timeout(self.timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => {
                    warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "Storage operation timed out");
                    Err(FeedError::StorageTimeout { operation })
                }
            },
        }
    }
}
