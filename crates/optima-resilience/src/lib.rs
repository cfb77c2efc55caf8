//! # Optima Resilience
//!
//! Resilience policies for Optima Licensing.
//! Provides circuit breaker, rate limiter, bulkhead, retry, and timeout,
//! composed into a [`ResiliencePipeline`] that turns every policy
//! intervention into a [`LookupOutcome::Degraded`] fallback value.

pub mod bulkhead;
pub mod circuit_breaker;
pub mod fault;
pub mod metrics;
pub mod pipeline;
pub mod rate_limiter;
pub mod retry;
pub mod timeout;

pub use bulkhead::*;
pub use circuit_breaker::*;
pub use fault::*;
pub use pipeline::*;
pub use rate_limiter::*;
pub use retry::*;
pub use timeout::*;
