//! Configuration validation.
//!
//! Every value is checked at load time so that a bad policy setting
//! fails startup instead of surfacing as odd runtime behaviour.

use crate::{
    AppConfig, CacheBackend, CacheConfig, ObservabilityConfig, OrganisationServiceConfig,
    PolicyConfig,
};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// A count or size that must be at least one is zero.
    ZeroValue { name: String },
    /// Failure rate threshold must be within 1-100.
    InvalidFailureRate { name: String, value: u8 },
    /// Minimum calls cannot exceed the sliding window size.
    MinimumCallsExceedWindow { name: String, minimum: usize, window: usize },
    /// Backoff multiplier must be at least 1.0.
    InvalidMultiplier { name: String, value: f64 },
    /// Initial backoff cannot exceed the maximum backoff.
    InvalidBackoffRange { name: String, initial: u64, max: u64 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Path template is missing the organisation id placeholder.
    InvalidPathTemplate { value: String },
    /// Value lies outside its permitted range.
    OutOfRange { name: String, value: u64, min: u64, max: u64 },
    /// Required string value is empty.
    EmptyValue { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroValue { name } => write!(f, "'{}' must be greater than zero", name),
            Self::InvalidFailureRate { name, value } => {
                write!(f, "Invalid failure rate for {}: {} (must be 1-100)", name, value)
            }
            Self::MinimumCallsExceedWindow { name, minimum, window } => {
                write!(
                    f,
                    "{}: minimum_calls ({}) cannot exceed sliding_window_size ({})",
                    name, minimum, window
                )
            }
            Self::InvalidMultiplier { name, value } => {
                write!(f, "Invalid multiplier for {}: {} (must be >= 1.0)", name, value)
            }
            Self::InvalidBackoffRange { name, initial, max } => {
                write!(
                    f,
                    "{}: initial_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
                    name, initial, max
                )
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::InvalidPathTemplate { value } => {
                write!(
                    f,
                    "Invalid path template '{}': must contain {{organisationId}} as a whole segment",
                    value
                )
            }
            Self::OutOfRange { name, value, min, max } => {
                write!(f, "'{}' is {} (must be {}-{})", name, value, min, max)
            }
            Self::EmptyValue { name } => write!(f, "'{}' must not be empty", name),
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (must be one of: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (must be json or pretty)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Accumulates validation errors.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    /// Returns true when no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the recorded errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigValidationError] {
        &self.errors
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const VALID_LOG_LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: [&'static str; 2] = ["json", "pretty"];
    const ORGANISATION_ID_PLACEHOLDER: &'static str = "{organisationId}";
    const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

    /// Validates the whole configuration, collecting every error.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::new();

        Self::validate_organisation_service(&config.organisation_service, &mut result);
        Self::validate_cache(&config.cache, &mut result);
        Self::validate_policy(
            "resilience.license_service",
            &config.resilience.license_service,
            &mut result,
        );
        Self::validate_policy(
            "resilience.organisation_service",
            &config.resilience.organisation_service,
            &mut result,
        );
        Self::validate_observability(&config.observability, &mut result);

        if config.fault_injection.enabled && config.fault_injection.every_nth_call == 0 {
            result.add_error(ConfigValidationError::ZeroValue {
                name: "fault_injection.every_nth_call".to_string(),
            });
        }

        if config.messages.default_locale.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyValue {
                name: "messages.default_locale".to_string(),
            });
        }

        result.into_result()
    }

    fn validate_organisation_service(
        config: &OrganisationServiceConfig,
        result: &mut ValidationResult,
    ) {
        if config.service_name.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyValue {
                name: "organisation_service.service_name".to_string(),
            });
        }

        if !config
            .path_template
            .split('/')
            .any(|segment| segment == Self::ORGANISATION_ID_PLACEHOLDER)
        {
            result.add_error(ConfigValidationError::InvalidPathTemplate {
                value: config.path_template.clone(),
            });
        }

        if config.request_timeout_ms == 0 {
            result.add_error(ConfigValidationError::ZeroValue {
                name: "organisation_service.request_timeout_ms".to_string(),
            });
        }

        for instance in &config.instances {
            if let Err(e) = Url::parse(&instance.url) {
                result.add_error(ConfigValidationError::InvalidUrl {
                    url_type: format!("organisation instance '{}'", instance.id),
                    message: e.to_string(),
                });
            }
        }
    }

    fn validate_cache(config: &CacheConfig, result: &mut ValidationResult) {
        if !(1..=Self::MAX_CACHE_TTL_SECS).contains(&config.ttl_secs) {
            result.add_error(ConfigValidationError::OutOfRange {
                name: "cache.ttl_secs".to_string(),
                value: config.ttl_secs,
                min: 1,
                max: Self::MAX_CACHE_TTL_SECS,
            });
        }

        if config.backend != CacheBackend::Redis {
            return;
        }

        if !config.redis_url.starts_with("redis://") && !config.redis_url.starts_with("rediss://")
        {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }

        if config.pool_size == 0 {
            result.add_error(ConfigValidationError::ZeroValue {
                name: "cache.pool_size".to_string(),
            });
        }
    }

    fn validate_policy(prefix: &str, config: &PolicyConfig, result: &mut ValidationResult) {
        let cb = &config.circuit_breaker;
        if cb.enabled {
            if cb.failure_rate_threshold == 0 || cb.failure_rate_threshold > 100 {
                result.add_error(ConfigValidationError::InvalidFailureRate {
                    name: format!("{}.circuit_breaker", prefix),
                    value: cb.failure_rate_threshold,
                });
            }
            for (name, value) in [
                ("sliding_window_size", cb.sliding_window_size),
                ("minimum_calls", cb.minimum_calls),
                ("permitted_calls_half_open", cb.permitted_calls_half_open as usize),
            ] {
                if value == 0 {
                    result.add_error(ConfigValidationError::ZeroValue {
                        name: format!("{}.circuit_breaker.{}", prefix, name),
                    });
                }
            }
            if cb.minimum_calls > cb.sliding_window_size {
                result.add_error(ConfigValidationError::MinimumCallsExceedWindow {
                    name: format!("{}.circuit_breaker", prefix),
                    minimum: cb.minimum_calls,
                    window: cb.sliding_window_size,
                });
            }
        }

        let rl = &config.rate_limiter;
        if rl.enabled {
            if rl.limit_for_period == 0 {
                result.add_error(ConfigValidationError::ZeroValue {
                    name: format!("{}.rate_limiter.limit_for_period", prefix),
                });
            }
            if rl.limit_refresh_period_ms == 0 {
                result.add_error(ConfigValidationError::ZeroValue {
                    name: format!("{}.rate_limiter.limit_refresh_period_ms", prefix),
                });
            }
        }

        if config.bulkhead.enabled && config.bulkhead.max_concurrent_calls == 0 {
            result.add_error(ConfigValidationError::ZeroValue {
                name: format!("{}.bulkhead.max_concurrent_calls", prefix),
            });
        }

        let retry = &config.retry;
        if retry.max_attempts == 0 {
            result.add_error(ConfigValidationError::ZeroValue {
                name: format!("{}.retry.max_attempts", prefix),
            });
        }
        if retry.multiplier < 1.0 {
            result.add_error(ConfigValidationError::InvalidMultiplier {
                name: format!("{}.retry", prefix),
                value: retry.multiplier,
            });
        }
        if retry.initial_backoff_ms > retry.max_backoff_ms {
            result.add_error(ConfigValidationError::InvalidBackoffRange {
                name: format!("{}.retry", prefix),
                initial: retry.initial_backoff_ms,
                max: retry.max_backoff_ms,
            });
        }
    }

    fn validate_observability(config: &ObservabilityConfig, result: &mut ValidationResult) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors into a single human-readable message.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut message = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        message.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    message
}
