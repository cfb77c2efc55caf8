//! Fixed-window rate limiter.
//!
//! Time is cut into consecutive windows of `refresh_period`, counted from
//! the limiter's creation. Each window admits at most `limit_for_period`
//! calls; the count resets at the next window boundary, never earlier.

use optima_config::RateLimiterSettings;
use optima_core::{OptimaError, OptimaResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct Window {
    started: Instant,
    admitted: u32,
}

/// Rate limiter admitting at most `limit_for_period` calls per refresh period.
///
/// Clones share the same quota.
#[derive(Clone)]
pub struct RateLimiter {
    name: String,
    limit_for_period: u32,
    refresh_period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    /// Creates a rate limiter for `limit_for_period` calls every `refresh_period`.
    pub fn new(name: impl Into<String>, limit_for_period: u32, refresh_period: Duration) -> Self {
        Self {
            name: name.into(),
            limit_for_period: limit_for_period.max(1),
            refresh_period: refresh_period.max(MIN_REFRESH_PERIOD),
            window: Arc::new(Mutex::new(Window {
                started: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// Creates a rate limiter with the specified requests per second.
    pub fn per_second(name: impl Into<String>, requests_per_second: u32) -> Self {
        Self::new(name, requests_per_second, Duration::from_secs(1))
    }

    /// Creates a rate limiter from configuration.
    pub fn from_settings(name: impl Into<String>, settings: &RateLimiterSettings) -> Self {
        Self::new(name, settings.limit_for_period, settings.limit_refresh_period())
    }

    /// Admits one call if the current window has capacity left (non-blocking).
    pub fn check(&self) -> OptimaResult<()> {
        let now = Instant::now();
        let mut window = self.window.lock();

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.refresh_period {
            window.started = now - self.offset_into_window(elapsed);
            window.admitted = 0;
        }

        if window.admitted < self.limit_for_period {
            window.admitted += 1;
            Ok(())
        } else {
            Err(OptimaError::RateLimitExceeded(self.name.clone()))
        }
    }

    fn offset_into_window(&self, elapsed: Duration) -> Duration {
        let offset = elapsed.as_nanos() % self.refresh_period.as_nanos();
        Duration::from_nanos(u64::try_from(offset).unwrap_or(0))
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("limit_for_period", &self.limit_for_period)
            .field("refresh_period", &self.refresh_period)
            .finish_non_exhaustive()
    }
}
