use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::record::ItemId;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Bounded retry for transient catalog failures.
///
/// Only errors reporting [`Error::is_transient`] are retried, with a fixed
/// delay between attempts. Anything else is returned from the attempt that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub async fn run<T, F, Fut>(&self, id: &ItemId, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retries < self.max_retries => {
                    retries += 1;
                    warn!("{} retry {}/{}: {}", id, retries, self.max_retries, e);
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) if e.is_transient() => {
                    let attempts = self.max_attempts();
                    error!("Lookup for {} failed after {} attempts", id, attempts);
                    return Err(Error::UpstreamRetriesExhausted {
                        item_id: id.to_string(),
                        attempts,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn id() -> ItemId {
        ItemId::parse("B000RETRY1").unwrap()
    }

    /// Fails transiently `failures` times, then succeeds with the attempt number.
    async fn flaky(calls: &AtomicU32, failures: u32) -> Result<u32> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= failures {
            Err(Error::UpstreamTransient("503 Service Unavailable".into()))
        } else {
            Ok(n)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_within_retry_budget() {
        for k in 0..=3 {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let result = RetryPolicy::default().run(&id(), move || flaky(counter, k)).await;
            assert_eq!(result.unwrap(), k + 1);
            assert_eq!(calls.load(Ordering::SeqCst), k + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_four_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::default().run(&id(), move || flaky(counter, 4)).await;
        assert!(matches!(
            result,
            Err(Error::UpstreamRetriesExhausted { attempts: 4, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_delay_between_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let start = tokio::time::Instant::now();
        RetryPolicy::default()
            .run(&id(), move || flaky(counter, 2))
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7));
    }

    #[test]
    fn test_max_attempts_counts_first_try() {
        assert_eq!(RetryPolicy::default().max_attempts(), 4);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::new(u32::MAX, Duration::ZERO).max_attempts(), u32::MAX);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run(&id(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::UpstreamPermanent("bad credentials".into()))
            })
            .await;
        assert!(matches!(result, Err(Error::UpstreamPermanent(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_escalates_first_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let result = policy.run(&id(), move || flaky(counter, 1)).await;
        assert!(matches!(
            result,
            Err(Error::UpstreamRetriesExhausted { attempts: 1, .. })
        ));
    }
}
