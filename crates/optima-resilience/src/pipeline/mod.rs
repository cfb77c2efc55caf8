//! Ordered composition of the resilience policies.
//!
//! Admission runs rate limiter, then bulkhead, then circuit breaker. An
//! admitted call goes through the retry loop, each attempt bounded by the
//! optional per-attempt timeout. The circuit breaker records one outcome
//! for the whole invocation.

mod outcome;

pub use outcome::LookupOutcome;

use crate::metrics::ResilienceMetrics;
use crate::{
    with_optional_timeout, Bulkhead, CircuitBreaker, CircuitBreakerConfig, RateLimiter,
    RetryPolicy,
};
use optima_config::PolicyConfig;
use optima_core::{OptimaError, OptimaResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback invoked with the original arguments and the triggering error.
pub type Fallback<A, T> = dyn Fn(&A, &OptimaError) -> T + Send + Sync;

/// Policies guarding one operation.
#[derive(Debug)]
pub struct ResiliencePipeline {
    name: String,
    rate_limiter: Option<RateLimiter>,
    bulkhead: Option<Bulkhead>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    retry: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl ResiliencePipeline {
    /// Starts building a pipeline with no policies and a single attempt.
    pub fn builder(name: impl Into<String>) -> ResiliencePipelineBuilder {
        ResiliencePipelineBuilder::new(name)
    }

    /// Builds a pipeline from configuration, skipping disabled policies.
    pub fn from_policy(name: &str, policy: &PolicyConfig) -> Self {
        let mut builder = Self::builder(name).retry(RetryPolicy::from(&policy.retry));

        if policy.rate_limiter.enabled {
            builder = builder.rate_limiter(RateLimiter::from_settings(name, &policy.rate_limiter));
        }
        if policy.bulkhead.enabled {
            builder = builder.bulkhead(Bulkhead::from_settings(name, &policy.bulkhead));
        }
        if policy.circuit_breaker.enabled {
            builder = builder.circuit_breaker(CircuitBreaker::new(
                name,
                CircuitBreakerConfig::from(&policy.circuit_breaker),
            ));
        }
        if let Some(timeout) = policy.attempt_timeout() {
            builder = builder.attempt_timeout(timeout);
        }

        builder.build()
    }

    /// Returns the pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the circuit breaker, if configured.
    pub fn circuit_breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.circuit_breaker.as_ref()
    }

    /// Returns the bulkhead, if configured.
    pub fn bulkhead(&self) -> Option<&Bulkhead> {
        self.bulkhead.as_ref()
    }

    /// Runs `f` through every policy and returns the raw result.
    ///
    /// Policy rejections surface as their `OptimaError` variants. Dropping
    /// the returned future releases the bulkhead and circuit breaker
    /// permits without recording an outcome.
    pub async fn run<F, Fut, T>(&self, mut f: F) -> OptimaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OptimaResult<T>>,
    {
        if let Some(limiter) = &self.rate_limiter {
            if let Err(e) = limiter.check() {
                ResilienceMetrics::call_rejected(&self.name, "rate_limiter");
                return Err(e);
            }
        }

        let _permit = match &self.bulkhead {
            Some(bulkhead) => match bulkhead.acquire().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    ResilienceMetrics::call_rejected(&self.name, "bulkhead");
                    return Err(e);
                }
            },
            None => None,
        };

        let circuit_permit = match &self.circuit_breaker {
            Some(breaker) => match breaker.try_acquire() {
                Ok(permit) => Some(permit),
                Err(e) => {
                    ResilienceMetrics::call_rejected(&self.name, "circuit_breaker");
                    return Err(e);
                }
            },
            None => None,
        };

        ResilienceMetrics::call_permitted(&self.name);

        let timeout = self.attempt_timeout;
        let result = self
            .retry
            .execute(&self.name, || {
                let attempt = f();
                with_optional_timeout(timeout, move || attempt)
            })
            .await;

        if let Some(permit) = circuit_permit {
            permit.record(&result);
        }

        result
    }

    /// Runs `f` through every policy, answering interventions with `fallback`.
    ///
    /// Policy rejections and transient failures that outlast the retry loop
    /// produce [`LookupOutcome::Degraded`]; other errors produce
    /// [`LookupOutcome::Failed`] and the fallback is not invoked.
    pub async fn execute<A, F, Fut, T>(
        &self,
        args: &A,
        f: F,
        fallback: &Fallback<A, T>,
    ) -> LookupOutcome<T>
    where
        A: ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = OptimaResult<T>>,
    {
        match self.run(f).await {
            Ok(value) => LookupOutcome::Success(value),
            Err(cause) if cause.is_policy_rejection() || cause.is_retriable() => {
                warn!(pipeline = %self.name, error = %cause, "Falling back to degraded result");
                ResilienceMetrics::fallback(&self.name, cause.error_code());
                let value = fallback(args, &cause);
                LookupOutcome::Degraded { value, cause }
            }
            Err(e) => {
                debug!(pipeline = %self.name, error = %e, "Call failed without fallback");
                LookupOutcome::Failed(e)
            }
        }
    }
}

/// Builder for [`ResiliencePipeline`].
#[derive(Debug)]
pub struct ResiliencePipelineBuilder {
    name: String,
    rate_limiter: Option<RateLimiter>,
    bulkhead: Option<Bulkhead>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    retry: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl ResiliencePipelineBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate_limiter: None,
            bulkhead: None,
            circuit_breaker: None,
            retry: RetryPolicy::none(),
            attempt_timeout: None,
        }
    }

    /// Sets the rate limiter.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Sets the bulkhead.
    #[must_use]
    pub fn bulkhead(mut self, bulkhead: Bulkhead) -> Self {
        self.bulkhead = Some(bulkhead);
        self
    }

    /// Sets the circuit breaker.
    #[must_use]
    pub fn circuit_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.circuit_breaker = Some(Arc::new(breaker));
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> ResiliencePipeline {
        ResiliencePipeline {
            name: self.name,
            rate_limiter: self.rate_limiter,
            bulkhead: self.bulkhead,
            circuit_breaker: self.circuit_breaker,
            retry: self.retry,
            attempt_timeout: self.attempt_timeout,
        }
    }
}

/// A pipeline bound to the single fallback shared by every failure mode.
pub struct GuardedCall<A: ?Sized, T> {
    pipeline: Arc<ResiliencePipeline>,
    fallback: Arc<Fallback<A, T>>,
}

impl<A: ?Sized, T> GuardedCall<A, T> {
    /// Binds `fallback` to `pipeline`.
    pub fn new<G>(pipeline: Arc<ResiliencePipeline>, fallback: G) -> Self
    where
        G: Fn(&A, &OptimaError) -> T + Send + Sync + 'static,
    {
        Self {
            pipeline,
            fallback: Arc::new(fallback),
        }
    }

    /// Returns the underlying pipeline.
    pub fn pipeline(&self) -> &Arc<ResiliencePipeline> {
        &self.pipeline
    }

    /// Runs `f` for `args` through the pipeline.
    pub async fn execute<F, Fut>(&self, args: &A, f: F) -> LookupOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OptimaResult<T>>,
    {
        self.pipeline.execute(args, f, self.fallback.as_ref()).await
    }
}

impl<A: ?Sized, T> Clone for GuardedCall<A, T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<A: ?Sized, T> std::fmt::Debug for GuardedCall<A, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedCall")
            .field("pipeline", &self.pipeline.name)
            .finish_non_exhaustive()
    }
}
