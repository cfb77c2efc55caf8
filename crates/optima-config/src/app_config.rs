//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name and metadata.
    pub app: AppMetadata,

    /// License service settings.
    pub licensing: LicensingConfig,

    /// Remote organisation service settings.
    pub organisation_service: OrganisationServiceConfig,

    /// Organisation cache settings.
    pub cache: CacheConfig,

    /// Resilience policies, one set per protected operation.
    pub resilience: ResilienceConfig,

    /// Fault injection seam (testing and demos only).
    pub fault_injection: FaultInjectionConfig,

    /// User-facing message bundles.
    pub messages: MessagesConfig,

    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "optima-licensing-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// License service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensingConfig {
    /// Comment stamped onto every license read.
    pub comment: String,
}

impl Default for LicensingConfig {
    fn default() -> Self {
        Self {
            comment: "I AM THE DEFAULT".to_string(),
        }
    }
}

/// Remote organisation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganisationServiceConfig {
    /// Logical service name used for registry lookups.
    pub service_name: String,
    /// Statically registered instances of the service.
    pub instances: Vec<ServiceInstanceConfig>,
    /// Path template; `{organisationId}` is replaced with the requested id.
    pub path_template: String,
    /// Per-request HTTP timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Client mode used when a caller does not name one.
    pub default_client: String,
}

impl Default for OrganisationServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "optima-organisation-service".to_string(),
            instances: vec![ServiceInstanceConfig::default()],
            path_template: "/v1/organisation/{organisationId}".to_string(),
            request_timeout_ms: 2_000,
            default_client: "rest".to_string(),
        }
    }
}

impl OrganisationServiceConfig {
    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// A statically registered service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstanceConfig {
    /// Instance identifier.
    pub id: String,
    /// Base URL of the instance.
    pub url: String,
    /// Whether the instance is eligible for traffic.
    pub up: bool,
}

impl Default for ServiceInstanceConfig {
    fn default() -> Self {
        Self {
            id: "organisation-1".to_string(),
            url: "http://localhost:8081".to_string(),
            up: true,
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis through a connection pool.
    #[default]
    Redis,
    /// In-process store with per-entry TTL.
    Memory,
    /// Every lookup is a miss.
    Disabled,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Organisation cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend to use.
    pub backend: CacheBackend,
    /// Redis URL.
    pub redis_url: String,
    /// Redis connection pool size.
    pub pool_size: usize,
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,
    /// Namespace prefix for cache keys.
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            ttl_secs: 300,
            key_prefix: "optima:cache".to_string(),
        }
    }
}

impl CacheConfig {
    /// Returns the TTL as a Duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Resilience policies per protected operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Policies around license listing.
    pub license_service: PolicyConfig,
    /// Policies around remote organisation lookups.
    pub organisation_service: PolicyConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            license_service: PolicyConfig::default(),
            organisation_service: PolicyConfig {
                timeout_ms: 2_500,
                ..PolicyConfig::default()
            },
        }
    }
}

/// The four protection policies plus the per-attempt timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerSettings,
    /// Rate limiter settings.
    pub rate_limiter: RateLimiterSettings,
    /// Bulkhead settings.
    pub bulkhead: BulkheadSettings,
    /// Retry settings.
    pub retry: RetrySettings,
    /// Per-attempt timeout in milliseconds (0 disables).
    pub timeout_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            circuit_breaker: CircuitBreakerSettings::default(),
            rate_limiter: RateLimiterSettings::default(),
            bulkhead: BulkheadSettings::default(),
            retry: RetrySettings::default(),
            timeout_ms: 3_000,
        }
    }
}

impl PolicyConfig {
    /// Returns the per-attempt timeout, if any.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// Enable the circuit breaker.
    pub enabled: bool,
    /// Failure rate (percent) at or above which the circuit opens.
    pub failure_rate_threshold: u8,
    /// Number of most recent outcomes kept in the rolling window.
    pub sliding_window_size: usize,
    /// Outcomes required before the failure rate is evaluated.
    pub minimum_calls: usize,
    /// Cooldown before an open circuit admits trial calls.
    pub wait_duration_open_ms: u64,
    /// Trial calls admitted while half-open.
    pub permitted_calls_half_open: u32,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_rate_threshold: 50,
            sliding_window_size: 10,
            minimum_calls: 5,
            wait_duration_open_ms: 10_000,
            permitted_calls_half_open: 3,
        }
    }
}

impl CircuitBreakerSettings {
    /// Returns the open-state cooldown as a Duration.
    #[must_use]
    pub const fn wait_duration_open(&self) -> Duration {
        Duration::from_millis(self.wait_duration_open_ms)
    }
}

/// Rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterSettings {
    /// Enable the rate limiter.
    pub enabled: bool,
    /// Calls admitted per refresh period.
    pub limit_for_period: u32,
    /// Length of the refresh period in milliseconds.
    pub limit_refresh_period_ms: u64,
}

impl Default for RateLimiterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            limit_for_period: 5,
            limit_refresh_period_ms: 5_000,
        }
    }
}

impl RateLimiterSettings {
    /// Returns the refresh period as a Duration.
    #[must_use]
    pub const fn limit_refresh_period(&self) -> Duration {
        Duration::from_millis(self.limit_refresh_period_ms)
    }
}

/// Bulkhead settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkheadSettings {
    /// Enable the bulkhead.
    pub enabled: bool,
    /// Maximum concurrently in-flight calls.
    pub max_concurrent_calls: usize,
    /// How long a call may wait for a permit (0 rejects immediately).
    pub max_wait_ms: u64,
}

impl Default for BulkheadSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrent_calls: 20,
            max_wait_ms: 0,
        }
    }
}

impl BulkheadSettings {
    /// Returns the permit wait as a Duration.
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for a single delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential backoff multiplier.
    pub multiplier: f64,
    /// Randomize delays.
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
            multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Fault injection seam settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultInjectionConfig {
    /// Enable injected latency on license listing.
    pub enabled: bool,
    /// Every Nth call is slowed down and fails with a timeout.
    pub every_nth_call: u64,
    /// Injected delay in milliseconds.
    pub delay_ms: u64,
}

impl Default for FaultInjectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            every_nth_call: 3,
            delay_ms: 5_000,
        }
    }
}

impl FaultInjectionConfig {
    /// Returns the injected delay as a Duration.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Message bundle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Locale used when a caller does not supply one.
    pub default_locale: String,
    /// Optional TOML file with extra or overriding bundles.
    pub bundle_path: Option<String>,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-GB".to_string(),
            bundle_path: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
    /// Enable metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}
