use std::time::Duration;

use rand::RngExt;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::models::Page;

use super::trait_def::{ListenSource, SourceError, SourceResult};

/// Bounded exponential backoff for page fetches
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (zero-based), with up to 50% jitter
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay);

        let jitter_ms = exp.as_millis() as u64 / 2;
        if jitter_ms == 0 {
            return exp;
        }
        let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_ms));
        (exp + jitter).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// Fetch one page, retrying transient failures according to `policy`.
///
/// Returns `Ok(None)` when `deadline` passes before any attempt failed. Once
/// an attempt has failed, running out of time returns that failure instead.
pub async fn fetch_with_retry(
    source: &dyn ListenSource,
    policy: &RetryPolicy,
    min_ts: i64,
    count: u32,
    deadline: Instant,
) -> SourceResult<Option<Page>> {
    let mut retries = 0;
    let mut last_err: Option<SourceError> = None;

    loop {
        let attempt = tokio::time::timeout_at(deadline, source.fetch_page(min_ts, count)).await;
        match attempt {
            Err(_) => {
                return match last_err {
                    Some(err) => {
                        warn!(min_ts, error = %err, "time limit reached while retrying page");
                        Err(err)
                    }
                    None => Ok(None),
                };
            }
            Ok(Ok(page)) => return Ok(Some(page)),
            Ok(Err(err)) if err.is_retryable() && retries < policy.max_retries => {
                let delay = policy.delay_for(retries);
                if Instant::now() + delay >= deadline {
                    warn!(min_ts, error = %err, "no time left to retry page");
                    return Err(err);
                }
                retries += 1;
                info!(
                    min_ts,
                    error = %err,
                    "page fetch failed, retry {} of {} in {:?}",
                    retries,
                    policy.max_retries,
                    delay
                );
                last_err = Some(err);
                tokio::time::sleep(delay).await;
            }
            Ok(Err(err)) => {
                if err.is_retryable() {
                    warn!(min_ts, error = %err, "giving up on page after {} retries", retries);
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListenRecord;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given status a fixed number of times, then succeeds
    struct Flaky {
        failures: u32,
        status: StatusCode,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ListenSource for Flaky {
        async fn fetch_page(&self, min_ts: i64, _count: u32) -> SourceResult<Page> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(SourceError::Status {
                    status: self.status,
                    body: "unavailable".to_string(),
                });
            }
            Ok(Page::new(vec![ListenRecord::new(min_ts + 1, "Air", "Playground Love")]))
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let source = Flaky {
            failures: 2,
            status: StatusCode::SERVICE_UNAVAILABLE,
            calls: AtomicU32::new(0),
        };

        let page = fetch_with_retry(&source, &fast_policy(3), 10, 100, far_deadline())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_when_retries_are_exhausted() {
        let source = Flaky {
            failures: 10,
            status: StatusCode::BAD_GATEWAY,
            calls: AtomicU32::new(0),
        };

        let result = fetch_with_retry(&source, &fast_policy(2), 10, 100, far_deadline()).await;
        assert!(result.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let source = Flaky {
            failures: 1,
            status: StatusCode::UNAUTHORIZED,
            calls: AtomicU32::new(0),
        };

        let result = fetch_with_retry(&source, &fast_policy(5), 10, 100, far_deadline()).await;
        assert!(matches!(result, Err(SourceError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_past_deadline_returns_last_error() {
        let source = Flaky {
            failures: u32::MAX,
            status: StatusCode::SERVICE_UNAVAILABLE,
            calls: AtomicU32::new(0),
        };
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        };
        let deadline = Instant::now() + Duration::from_secs(1);

        let result = fetch_with_retry(&source, &policy, 10, 100, deadline).await;

        assert!(matches!(result, Err(SourceError::Status { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
        };

        assert!(policy.delay_for(0) >= Duration::from_millis(100));
        assert!(policy.delay_for(0) <= Duration::from_millis(150));
        assert_eq!(policy.delay_for(8), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(1_000));
    }
}
