//! Metrics emitted by the service layer.

use metrics::{counter, describe_counter};

/// Metric names for the service layer.
pub mod names {
    /// Organisation cache hits.
    pub const CACHE_HITS_TOTAL: &str = "optima_cache_hits_total";
    /// Organisation cache misses.
    pub const CACHE_MISSES_TOTAL: &str = "optima_cache_misses_total";
    /// Swallowed cache failures, labelled by `operation`.
    pub const CACHE_ERRORS_TOTAL: &str = "optima_cache_errors_total";
    /// Remote organisation fetches, labelled by `client` and `outcome`.
    pub const REMOTE_FETCHES_TOTAL: &str = "optima_remote_fetches_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of organisation cache hits"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of organisation cache misses"
    );
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total number of cache failures treated as misses or skipped writes"
    );
    describe_counter!(
        names::REMOTE_FETCHES_TOTAL,
        "Total number of remote organisation fetches"
    );
}

/// Service metrics recorder.
#[derive(Clone)]
pub struct ServiceMetrics;

impl ServiceMetrics {
    /// Record a cache hit.
    pub fn cache_hit() {
        counter!(names::CACHE_HITS_TOTAL).increment(1);
    }

    /// Record a cache miss.
    pub fn cache_miss() {
        counter!(names::CACHE_MISSES_TOTAL).increment(1);
    }

    /// Record a swallowed cache failure.
    pub fn cache_error(operation: &'static str) {
        counter!(names::CACHE_ERRORS_TOTAL, "operation" => operation).increment(1);
    }

    /// Record a remote fetch.
    pub fn remote_fetch(client: &'static str, outcome: &'static str) {
        counter!(
            names::REMOTE_FETCHES_TOTAL,
            "client" => client,
            "outcome" => outcome
        )
        .increment(1);
    }
}
