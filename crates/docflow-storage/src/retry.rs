//! Centralized retry-with-backoff policy for object-store calls.
//!
//! One policy instance is shared by all retried operations in a backend; the
//! non-retryable classification lives on `StorageError::is_retryable`, so
//! a definitive not-found never burns the attempt budget.

use std::future::Future;
use std::time::Duration;

use crate::traits::StorageResult;

/// Bounded retry with exponential backoff (the delay doubles per attempt).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is exhausted (the last error is surfaced as-is).
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        error = %err,
                        operation = operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Storage operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{FailureKind, StorageError};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run("test.op", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(StorageError::backend(FailureKind::Network, "flaky"))
                    } else {
                        Ok(42u32)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: StorageResult<()> = fast_policy()
            .run("test.op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StorageError::backend(FailureKind::Timeout, "slow")) }
            })
            .await;
        assert!(matches!(
            result,
            Err(StorageError::Backend {
                kind: FailureKind::Timeout,
                ..
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_never_retried() {
        let calls = AtomicU32::new(0);
        let result: StorageResult<()> = fast_policy()
            .run("test.op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(StorageError::NotFound("documents/x".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
