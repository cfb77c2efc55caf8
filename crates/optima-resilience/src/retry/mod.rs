//! Retry policy implementation.

use crate::metrics::ResilienceMetrics;
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use optima_config::RetrySettings;
use optima_core::OptimaResult;
use std::time::Duration;
use tracing::debug;

const JITTER_FACTOR: f64 = 0.25;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_backoff_ms),
            max_delay: Duration::from_millis(settings.max_backoff_ms),
            multiplier: settings.multiplier,
            jitter: settings.jitter,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with the specified max attempts.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Creates a policy that makes a single attempt.
    pub fn none() -> Self {
        Self::with_max_attempts(1)
    }

    /// Builds the backoff schedule for one invocation.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_multiplier(self.multiplier)
            .with_max_interval(self.max_delay)
            .with_randomization_factor(if self.jitter { JITTER_FACTOR } else { 0.0 })
            .with_max_elapsed_time(None)
            .build()
    }

    /// Executes a function with retry logic, labelling metrics with `name`.
    ///
    /// Only retriable errors are retried. The last error is returned once
    /// attempts are exhausted.
    pub async fn execute<F, Fut, T>(&self, name: &str, mut f: F) -> OptimaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = OptimaResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.backoff();
        let mut attempt = 1;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retriable() || attempt >= max_attempts => {
                    debug!("Attempt {} of '{}' failed, giving up: {}", attempt, name, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff.next_backoff().unwrap_or(self.max_delay);
                    debug!(
                        "Attempt {} of '{}' failed: {}; retrying after {:?}",
                        attempt, name, e, delay
                    );
                    ResilienceMetrics::retried(name, attempt);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optima_core::OptimaError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_retry_success() {
        let policy = RetryPolicy::with_max_attempts(3);
        let result = policy.execute("test", || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fail_fail_succeed() {
        let policy = fast_policy(3);
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = policy
            .execute("test", || {
                let attempts = attempts_clone.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(OptimaError::Timeout("not yet".into()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_counts_exact_attempts() {
        let policy = fast_policy(3);
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: OptimaResult<i32> = policy
            .execute("test", || {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err(OptimaError::remote_unavailable("organisation", "503"))
                }
            })
            .await;

        assert!(matches!(result, Err(OptimaError::ExternalService { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retriable_error_is_not_retried() {
        let policy = fast_policy(5);
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: OptimaResult<i32> = policy
            .execute("test", || {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err(OptimaError::remote_rejected("organisation", "400"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_grows_and_is_capped() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            multiplier: 2.0,
            jitter: false,
            ..Default::default()
        };

        let mut backoff = policy.backoff();
        let delays: Vec<u128> = (0..4)
            .filter_map(|_| backoff.next_backoff())
            .map(|d| d.as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 300, 300]);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = RetrySettings {
            max_attempts: 0,
            initial_backoff_ms: 50,
            ..RetrySettings::default()
        };
        let policy = RetryPolicy::from(&settings);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.initial_delay, Duration::from_millis(50));
    }
}
