/// Polling utilities for waiting on conditions with timeout and backoff
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::InstallError;

/// Configuration for polling operations
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub description: String,
}

impl PollingConfig {
    /// Create a new polling configuration
    pub fn new(
        timeout: Duration,
        initial_interval: Duration,
        max_interval: Duration,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timeout,
            initial_interval,
            max_interval: max_interval.max(initial_interval),
            description: description.into(),
        }
    }

    /// Interval to wait after `attempt` unsuccessful attempts (1-based)
    pub fn interval_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_interval
            .saturating_mul(factor)
            .min(self.max_interval)
    }

    /// Poll until condition is met or timeout
    ///
    /// The condition function should return:
    /// - Ok(Some(T)) when condition is met (returns T)
    /// - Ok(None) when condition is not yet met (continues polling)
    /// - Err(e) when an error occurs (stops polling and returns error)
    ///
    /// Running out of time yields `InstallError::Timeout`.
    pub async fn poll<F, Fut, T>(&self, mut condition: F) -> Result<T, InstallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, InstallError>>,
    {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            if let Some(value) = condition().await? {
                debug!("{} after {} attempt(s)", self.description, attempt);
                return Ok(value);
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(InstallError::Timeout {
                    what: self.description.clone(),
                    secs: self.timeout.as_secs(),
                });
            }

            let wait = self.interval_after(attempt).min(self.timeout - elapsed);
            debug!(
                "{}: attempt {} not ready, retrying in {:?}",
                self.description, attempt, wait
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick(timeout_ms: u64) -> PollingConfig {
        PollingConfig::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(5),
            Duration::from_millis(20),
            "test polling",
        )
    }

    #[tokio::test]
    async fn test_polling_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = quick(5_000)
            .poll(|| {
                let c = counter_clone.clone();
                async move {
                    let val = c.fetch_add(1, Ordering::SeqCst);
                    if val >= 2 {
                        Ok(Some(val))
                    } else {
                        Ok(None)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_polling_timeout_is_distinct_error() {
        let result = quick(50)
            .poll(|| async { Ok::<Option<()>, InstallError>(None) })
            .await;

        assert!(matches!(result, Err(InstallError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_polling_stops_on_condition_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = quick(5_000)
            .poll(|| {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(InstallError::command_failed("Checking"))
                }
            })
            .await;

        assert!(matches!(result, Err(InstallError::CommandFailed { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = quick(1_000);
        assert_eq!(config.interval_after(1), Duration::from_millis(5));
        assert_eq!(config.interval_after(2), Duration::from_millis(10));
        assert_eq!(config.interval_after(3), Duration::from_millis(20));
        assert_eq!(config.interval_after(4), Duration::from_millis(20));
        assert_eq!(config.interval_after(60), Duration::from_millis(20));
    }
}
