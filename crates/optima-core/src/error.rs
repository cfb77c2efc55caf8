//! Unified error types for all layers of the licensing service.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Optima Licensing.
///
/// Covers domain, infrastructure, and resilience failures. Resilience
/// variants are produced by the policy pipeline and are normally converted
/// into a degraded fallback before reaching a caller.
#[derive(Error, Debug)]
pub enum OptimaError {
    // ============ Domain Errors ============
    /// Resource not found. `message` is the user-facing (possibly localized) text.
    #[error("{message}")]
    NotFound {
        resource_type: &'static str,
        id: String,
        message: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Infrastructure Errors ============
    /// License store error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote service error
    #[error("External service error: {service} - {message}")]
    ExternalService {
        service: String,
        message: String,
        retryable: bool,
    },

    /// Cache read/write error
    #[error("Cache error: {0}")]
    Cache(String),

    // ============ Resilience Errors ============
    /// Circuit breaker open
    #[error("Service unavailable: circuit breaker open for {0}")]
    CircuitBreakerOpen(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded for {0}")]
    RateLimitExceeded(String),

    /// Bulkhead has no free permits
    #[error("Bulkhead full for {0}")]
    BulkheadFull(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OptimaError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::CircuitBreakerOpen(_) | Self::Timeout(_) | Self::BulkheadFull(_) => 503,
            Self::RateLimitExceeded(_) => 429,
            Self::ExternalService { .. } => 502,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Cache(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::CircuitBreakerOpen(_) => "CIRCUIT_BREAKER_OPEN",
            Self::Timeout(_) => "TIMEOUT",
            Self::RateLimitExceeded(_) => "RATE_LIMIT_EXCEEDED",
            Self::BulkheadFull(_) => "BULKHEAD_FULL",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error with a default message.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        let id = id.to_string();
        Self::NotFound {
            message: format!("Resource not found: {} with id {}", resource_type, id),
            resource_type,
            id,
        }
    }

    /// Creates a not found error carrying a preformatted message.
    #[must_use]
    pub fn not_found_with_message<T: ToString>(
        resource_type: &'static str,
        id: T,
        message: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a retryable external service error (unreachable host, 5xx).
    #[must_use]
    pub fn remote_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable external service error (4xx, bad payload).
    #[must_use]
    pub fn remote_rejected(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Database(_) | Self::Timeout(_) => true,
            Self::ExternalService { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Checks if this error should count as a failure for the circuit breaker.
    #[must_use]
    pub const fn should_trip_circuit_breaker(&self) -> bool {
        self.is_retriable()
    }

    /// Checks if this error was raised by an admission policy rather than the call itself.
    #[must_use]
    pub const fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::CircuitBreakerOpen(_) | Self::RateLimitExceeded(_) | Self::BulkheadFull(_)
        )
    }
}

impl From<serde_json::Error> for OptimaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable summary of an [`OptimaError`]: its stable code, display
/// message and the correlation id of the failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Rejected fields, when validation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Correlation ID of the failing request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// One rejected field of a validated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from an `OptimaError`.
    #[must_use]
    pub fn from_error(error: &OptimaError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
            correlation_id: None,
        }
    }

    /// Sets the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&OptimaError> for ErrorResponse {
    fn from(error: &OptimaError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(OptimaError::not_found("License", "L1").status_code(), 404);
        assert_eq!(OptimaError::validation("bad").status_code(), 400);
        assert_eq!(OptimaError::RateLimitExceeded("x".into()).status_code(), 429);
        assert_eq!(OptimaError::BulkheadFull("x".into()).status_code(), 503);
        assert_eq!(OptimaError::CircuitBreakerOpen("x".into()).status_code(), 503);
        assert_eq!(OptimaError::remote_unavailable("org", "down").status_code(), 502);
        assert_eq!(OptimaError::Cache("down".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(OptimaError::not_found("License", 1).error_code(), "NOT_FOUND");
        assert_eq!(OptimaError::Timeout("t".into()).error_code(), "TIMEOUT");
        assert_eq!(OptimaError::BulkheadFull("b".into()).error_code(), "BULKHEAD_FULL");
        assert_eq!(OptimaError::internal("x").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(OptimaError::Timeout("slow".into()).is_retriable());
        assert!(OptimaError::Database("lost".into()).is_retriable());
        assert!(OptimaError::remote_unavailable("org", "503").is_retriable());
        assert!(!OptimaError::remote_rejected("org", "400").is_retriable());
        assert!(!OptimaError::not_found("License", 1).is_retriable());
        assert!(!OptimaError::RateLimitExceeded("x".into()).is_retriable());
        assert!(!OptimaError::Cache("down".into()).is_retriable());
    }

    #[test]
    fn test_policy_rejections() {
        assert!(OptimaError::CircuitBreakerOpen("a".into()).is_policy_rejection());
        assert!(OptimaError::RateLimitExceeded("a".into()).is_policy_rejection());
        assert!(OptimaError::BulkheadFull("a".into()).is_policy_rejection());
        assert!(!OptimaError::Timeout("a".into()).is_policy_rejection());
    }

    #[test]
    fn test_not_found_message_is_display() {
        let err = OptimaError::not_found_with_message("License", "L1", "no license L1 for O1");
        assert_eq!(err.to_string(), "no license L1 for O1");

        let default = OptimaError::not_found("License", "L2");
        assert!(default.to_string().contains("L2"));
    }

    #[test]
    fn test_error_response_from_error() {
        let err = OptimaError::not_found("License", 1);
        let response = ErrorResponse::from_error(&err).with_correlation_id("corr-1");
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.correlation_id.as_deref(), Some("corr-1"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_omits_absent_fields() {
        let json = serde_json::to_value(ErrorResponse::from_error(&OptimaError::Timeout(
            "organisation-service".into(),
        )))
        .unwrap();
        assert_eq!(json["code"], "TIMEOUT");
        assert!(json.get("details").is_none());
        assert!(json.get("correlation_id").is_none());
    }
}
