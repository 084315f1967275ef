//! Boundary retry policy for ledger reads
//!
//! Only `LedgerUnavailable` is retried. A reverted call is a definite answer
//! from the contract (for example an already-settled claim) and is returned
//! to the client unchanged.

use std::future::Future;
use std::time::Duration;

use claim_core::Result;

/// Upper bound on a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Sleep before the first retry; doubled for each further retry
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    /// Run `op`, retrying transient ledger failures with exponential backoff
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = self.backoff(attempt);
                    tracing::debug!(
                        operation,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Retrying ledger read"
                    );
                    metrics::counter!("claim_gateway_ledger_retries_total", "operation" => operation)
                        .increment(1);
                    tokio::time::sleep(backoff).await;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_core::GatewayError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(40), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_unavailable_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = AtomicU32::new(0);

        let result = policy
            .run("stats", || async {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(GatewayError::LedgerUnavailable("timeout".into()))
                } else {
                    Ok(5u8)
                }
            })
            .await;

        assert_eq!(result, Ok(5));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let attempts = AtomicU32::new(0);

        let result: Result<u8> = policy
            .run("stats", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(GatewayError::LedgerUnavailable("down".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_never_retries_revert_or_input_errors() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        for error in [
            GatewayError::LedgerCallReverted("already claimed".into()),
            GatewayError::InvalidAddress("0xZZZ".into()),
        ] {
            let attempts = AtomicU32::new(0);
            let result: Result<u8> = policy
                .run("resolve", || {
                    let error = error.clone();
                    let attempts = &attempts;
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err(error)
                    }
                })
                .await;

            assert_eq!(result, Err(error));
            assert_eq!(attempts.load(Ordering::SeqCst), 1);
        }
    }
}
