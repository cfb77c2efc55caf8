//! Injected latency for exercising the resilience policies.

use optima_config::FaultInjectionConfig;
use optima_core::{OptimaError, OptimaResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

/// Slows down every Nth call and then fails it with a timeout.
///
/// Disabled injectors are a no-op.
#[derive(Debug)]
pub struct FaultInjector {
    enabled: bool,
    every_nth_call: u64,
    delay: Duration,
    calls: AtomicU64,
}

impl FaultInjector {
    /// Creates an enabled injector.
    pub fn new(every_nth_call: u64, delay: Duration) -> Self {
        Self {
            enabled: true,
            every_nth_call: every_nth_call.max(1),
            delay,
            calls: AtomicU64::new(0),
        }
    }

    /// Creates an injector that never injects.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(1, Duration::ZERO)
        }
    }

    /// Creates an injector from configuration.
    pub fn from_config(config: &FaultInjectionConfig) -> Self {
        if config.enabled {
            Self::new(config.every_nth_call, config.delay())
        } else {
            Self::disabled()
        }
    }

    /// Returns whether injection is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Counts a call and, on every Nth one, sleeps then fails with `Timeout`.
    pub async fn maybe_inject(&self, operation: &str) -> OptimaResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call % self.every_nth_call != 0 {
            return Ok(());
        }

        warn!(call, delay = ?self.delay, "Injecting latency into '{}'", operation);
        tokio::time::sleep(self.delay).await;
        Err(OptimaError::Timeout(format!(
            "Injected delay of {:?} in {}",
            self.delay, operation
        )))
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_never_injects() {
        let injector = FaultInjector::disabled();
        for _ in 0..10 {
            assert!(injector.maybe_inject("listLicenses").await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_every_third_call_times_out() {
        let injector = FaultInjector::new(3, Duration::from_millis(1));
        let mut outcomes = Vec::new();
        for _ in 0..6 {
            outcomes.push(injector.maybe_inject("listLicenses").await.is_ok());
        }
        assert_eq!(outcomes, vec![true, true, false, true, true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_call_sleeps_for_delay() {
        let injector = FaultInjector::new(1, Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        let err = injector.maybe_inject("listLicenses").await.unwrap_err();

        assert!(matches!(err, OptimaError::Timeout(_)));
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_from_config_respects_enabled_flag() {
        let config = FaultInjectionConfig::default();
        assert!(!FaultInjector::from_config(&config).is_enabled());

        let enabled = FaultInjectionConfig {
            enabled: true,
            ..FaultInjectionConfig::default()
        };
        assert!(FaultInjector::from_config(&enabled).is_enabled());
    }
}
