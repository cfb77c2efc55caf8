//! Server startup utilities.

use optima_config::{AppConfig, PolicyConfig};
use tracing::info;

/// Logs the effective configuration of the lookup subsystem.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!(
        "Organisation service: {} ({} instance(s), default client '{}')",
        config.organisation_service.service_name,
        config.organisation_service.instances.len(),
        config.organisation_service.default_client
    );
    info!(
        "Cache: {} (ttl {}s, prefix '{}')",
        config.cache.backend, config.cache.ttl_secs, config.cache.key_prefix
    );
    info!(
        "License policies: {}",
        describe_policy(&config.resilience.license_service)
    );
    info!(
        "Organisation policies: {}",
        describe_policy(&config.resilience.organisation_service)
    );
    if config.fault_injection.enabled {
        info!(
            "Fault injection: every {} call(s), {}ms delay",
            config.fault_injection.every_nth_call, config.fault_injection.delay_ms
        );
    }
    info!("{}", separator);
}

/// One-line summary of the enabled policies.
pub fn describe_policy(policy: &PolicyConfig) -> String {
    let mut parts = Vec::new();

    if policy.rate_limiter.enabled {
        parts.push(format!(
            "rate {}/{}ms",
            policy.rate_limiter.limit_for_period, policy.rate_limiter.limit_refresh_period_ms
        ));
    }
    if policy.bulkhead.enabled {
        parts.push(format!("bulkhead {}", policy.bulkhead.max_concurrent_calls));
    }
    if policy.circuit_breaker.enabled {
        parts.push(format!(
            "breaker {}%/{}",
            policy.circuit_breaker.failure_rate_threshold,
            policy.circuit_breaker.sliding_window_size
        ));
    }
    parts.push(format!("retry x{}", policy.retry.max_attempts));
    if policy.timeout_ms > 0 {
        parts.push(format!("timeout {}ms", policy.timeout_ms));
    }

    parts.join(", ")
}
