//! Circuit breaker implementation.
//!
//! Outcomes are kept in a count-based rolling window. Once the window holds
//! at least `minimum_calls` outcomes and the failure rate reaches the
//! threshold, the circuit opens. After `wait_duration_open` a limited number
//! of trial calls are admitted; all of them must succeed to close again.

use crate::metrics::ResilienceMetrics;
use optima_config::CircuitBreakerSettings;
use optima_core::{OptimaError, OptimaResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed - requests are allowed.
    Closed,
    /// Circuit is open - requests are rejected.
    Open,
    /// Circuit is half-open - limited trial requests are allowed.
    HalfOpen,
}

impl CircuitState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure rate in percent at or above which the circuit opens.
    pub failure_rate_threshold: f64,
    /// Number of most recent outcomes kept in the rolling window.
    pub sliding_window_size: usize,
    /// Outcomes required before the failure rate is evaluated.
    pub minimum_calls: usize,
    /// Duration to wait before transitioning from open to half-open.
    pub wait_duration_open: Duration,
    /// Number of trial calls allowed in half-open state.
    pub permitted_calls_half_open: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_calls: 5,
            wait_duration_open: Duration::from_secs(10),
            permitted_calls_half_open: 3,
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        Self {
            failure_rate_threshold: f64::from(settings.failure_rate_threshold),
            sliding_window_size: settings.sliding_window_size.max(1),
            minimum_calls: settings.minimum_calls.max(1),
            wait_duration_open: settings.wait_duration_open(),
            permitted_calls_half_open: settings.permitted_calls_half_open.max(1),
        }
    }
}

/// Point-in-time view of a circuit breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerMetrics {
    /// Current state.
    pub state: CircuitState,
    /// Outcomes currently in the rolling window.
    pub buffered_calls: usize,
    /// Failures currently in the rolling window.
    pub failed_calls: usize,
    /// Failure rate in percent, once `minimum_calls` outcomes are buffered.
    pub failure_rate: Option<f64>,
    /// Calls rejected since creation or the last reset.
    pub not_permitted_calls: u64,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    // Bumped on every transition; outcomes from an earlier state are dropped.
    generation: u64,
    // true = failure
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_admitted: u32,
    half_open_successes: u32,
    not_permitted: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            generation: 0,
            window: VecDeque::new(),
            opened_at: None,
            half_open_admitted: 0,
            half_open_successes: 0,
            not_permitted: 0,
        }
    }

    fn failures(&self) -> usize {
        self.window.iter().filter(|failed| **failed).count()
    }

    #[allow(clippy::cast_precision_loss)]
    fn failure_rate(&self, minimum_calls: usize) -> Option<f64> {
        if self.window.len() < minimum_calls || self.window.is_empty() {
            return None;
        }
        Some(self.failures() as f64 * 100.0 / self.window.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
    Ignored,
}

/// Permission for one call, granted by [`CircuitBreaker::try_acquire`].
///
/// Dropping the permit without calling [`record`](Self::record) releases
/// it without an outcome, which frees a half-open trial slot when the
/// caller abandons the call.
#[must_use = "dropping the permit releases it without recording an outcome"]
pub struct CircuitPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    released: bool,
}

impl CircuitPermit<'_> {
    /// Records the result of the permitted call.
    ///
    /// Only errors for which [`OptimaError::should_trip_circuit_breaker`]
    /// holds count as failures.
    pub fn record<T>(mut self, result: &OptimaResult<T>) {
        let outcome = match result {
            Ok(_) => Outcome::Success,
            Err(e) if e.should_trip_circuit_breaker() => Outcome::Failure,
            Err(_) => Outcome::Ignored,
        };
        self.released = true;
        self.breaker.complete(self.generation, outcome);
    }
}

impl Drop for CircuitPermit<'_> {
    fn drop(&mut self) {
        if !self.released {
            debug!(
                "Circuit breaker '{}' permit dropped without an outcome",
                self.breaker.name
            );
            self.breaker.complete(self.generation, Outcome::Ignored);
        }
    }
}

impl fmt::Debug for CircuitPermit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitPermit")
            .field("breaker", &self.breaker.name)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Circuit breaker for protecting against cascading failures.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Returns the current state of the circuit breaker.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Returns the name of the circuit breaker.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a snapshot of the rolling window and counters.
    pub fn metrics_snapshot(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state,
            buffered_calls: inner.window.len(),
            failed_calls: inner.failures(),
            failure_rate: inner.failure_rate(self.config.minimum_calls),
            not_permitted_calls: inner.not_permitted,
        }
    }

    /// Asks for permission to make a call.
    pub fn try_acquire(&self) -> OptimaResult<CircuitPermit<'_>> {
        let mut inner = self.inner.lock();

        let permitted = match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map_or(true, |at| at.elapsed() >= self.config.wait_duration_open);
                if cooled_down {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.half_open_admitted = 1;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_admitted < self.config.permitted_calls_half_open {
                    inner.half_open_admitted += 1;
                    true
                } else {
                    false
                }
            }
        };

        if permitted {
            Ok(CircuitPermit {
                breaker: self,
                generation: inner.generation,
                released: false,
            })
        } else {
            inner.not_permitted += 1;
            debug!("Circuit breaker '{}' rejected call", self.name);
            Err(OptimaError::CircuitBreakerOpen(self.name.clone()))
        }
    }

    /// Manually resets the circuit breaker to closed state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let generation = inner.generation + 1;
        *inner = Inner::new();
        inner.generation = generation;
        debug!("Circuit breaker '{}' manually reset", self.name);
    }

    fn complete(&self, generation: u64, outcome: Outcome) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                "Circuit breaker '{}' dropped {:?} outcome from an earlier state",
                self.name, outcome
            );
            return;
        }

        match (inner.state, outcome) {
            (CircuitState::Closed, Outcome::Success) => self.push_outcome(&mut inner, false),
            (CircuitState::Closed, Outcome::Failure) => self.push_outcome(&mut inner, true),
            (CircuitState::HalfOpen, Outcome::Success) => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.permitted_calls_half_open {
                    self.transition(&mut inner, CircuitState::Closed);
                    debug!("Circuit breaker '{}' closed after successful recovery", self.name);
                }
            }
            (CircuitState::HalfOpen, Outcome::Failure) => {
                self.transition(&mut inner, CircuitState::Open);
                warn!(
                    "Circuit breaker '{}' reopened after failure in half-open state",
                    self.name
                );
            }
            (CircuitState::HalfOpen, Outcome::Ignored) => {
                inner.half_open_admitted = inner.half_open_admitted.saturating_sub(1);
            }
            (CircuitState::Closed, Outcome::Ignored) | (CircuitState::Open, _) => {}
        }
    }

    fn push_outcome(&self, inner: &mut Inner, failed: bool) {
        inner.window.push_back(failed);
        while inner.window.len() > self.config.sliding_window_size {
            inner.window.pop_front();
        }

        if let Some(rate) = inner.failure_rate(self.config.minimum_calls) {
            if rate >= self.config.failure_rate_threshold {
                self.transition(inner, CircuitState::Open);
                warn!(
                    "Circuit breaker '{}' opened at failure rate {:.1}%",
                    self.name, rate
                );
            }
        }
    }

    fn transition(&self, inner: &mut Inner, to: CircuitState) {
        inner.state = to;
        inner.generation += 1;
        inner.half_open_admitted = 0;
        inner.half_open_successes = 0;
        match to {
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
            CircuitState::HalfOpen => {}
            CircuitState::Closed => {
                inner.opened_at = None;
                inner.window.clear();
            }
        }
        ResilienceMetrics::breaker_transition(&self.name, to.as_str());
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
