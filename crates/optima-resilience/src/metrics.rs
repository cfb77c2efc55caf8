//! Metrics emitted by the resilience policies.

use metrics::{counter, describe_counter};

/// Metric names for the resilience policies.
pub mod names {
    /// Calls admitted by every policy.
    pub const CALLS_PERMITTED_TOTAL: &str = "optima_resilience_calls_permitted_total";
    /// Calls rejected by a policy, labelled by `policy`.
    pub const CALLS_REJECTED_TOTAL: &str = "optima_resilience_calls_rejected_total";
    /// Invocations answered by the fallback.
    pub const FALLBACKS_TOTAL: &str = "optima_resilience_fallbacks_total";
    /// Retry attempts after a failed call.
    pub const RETRIES_TOTAL: &str = "optima_resilience_retries_total";
    /// Circuit breaker state transitions, labelled by `to`.
    pub const BREAKER_TRANSITIONS_TOTAL: &str = "optima_resilience_breaker_transitions_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CALLS_PERMITTED_TOTAL,
        "Total number of calls admitted by all resilience policies"
    );
    describe_counter!(
        names::CALLS_REJECTED_TOTAL,
        "Total number of calls rejected by a resilience policy"
    );
    describe_counter!(
        names::FALLBACKS_TOTAL,
        "Total number of invocations answered by a fallback"
    );
    describe_counter!(
        names::RETRIES_TOTAL,
        "Total number of retry attempts"
    );
    describe_counter!(
        names::BREAKER_TRANSITIONS_TOTAL,
        "Total number of circuit breaker state transitions"
    );
}

/// Resilience metrics recorder.
#[derive(Clone)]
pub struct ResilienceMetrics;

impl ResilienceMetrics {
    /// Record a call admitted by every policy.
    pub fn call_permitted(name: &str) {
        counter!(names::CALLS_PERMITTED_TOTAL, "name" => name.to_string()).increment(1);
    }

    /// Record a call rejected by a policy.
    pub fn call_rejected(name: &str, policy: &'static str) {
        counter!(
            names::CALLS_REJECTED_TOTAL,
            "name" => name.to_string(),
            "policy" => policy
        )
        .increment(1);
    }

    /// Record a fallback.
    pub fn fallback(name: &str, cause: &'static str) {
        counter!(
            names::FALLBACKS_TOTAL,
            "name" => name.to_string(),
            "cause" => cause
        )
        .increment(1);
    }

    /// Record a retry attempt.
    pub fn retried(name: &str, attempt: u32) {
        counter!(
            names::RETRIES_TOTAL,
            "name" => name.to_string(),
            "attempt" => attempt.to_string()
        )
        .increment(1);
    }

    /// Record a circuit breaker transition.
    pub fn breaker_transition(name: &str, to: &'static str) {
        counter!(
            names::BREAKER_TRANSITIONS_TOTAL,
            "name" => name.to_string(),
            "to" => to
        )
        .increment(1);
    }
}
