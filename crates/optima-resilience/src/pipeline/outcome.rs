//! Result of a resilience-wrapped invocation.

use optima_core::{OptimaError, OptimaResult};

/// Exactly one of these is produced per pipeline invocation.
#[derive(Debug)]
pub enum LookupOutcome<T> {
    /// The wrapped call produced a value.
    Success(T),
    /// A policy intervened or retries were exhausted; `value` came from the fallback.
    Degraded {
        /// Fallback value.
        value: T,
        /// The error that triggered the fallback.
        cause: OptimaError,
    },
    /// The wrapped call failed with a non-transient error.
    Failed(OptimaError),
}

impl<T> LookupOutcome<T> {
    /// Returns true for [`LookupOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for [`LookupOutcome::Degraded`].
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Returns the value, whether real or fallback.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Returns the error behind a degraded or failed outcome.
    pub fn cause(&self) -> Option<&OptimaError> {
        match self {
            Self::Success(_) => None,
            Self::Degraded { cause, .. } | Self::Failed(cause) => Some(cause),
        }
    }

    /// Converts into a result, treating a degraded value as success.
    pub fn into_result(self) -> OptimaResult<T> {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => Ok(value),
            Self::Failed(e) => Err(e),
        }
    }

    /// Maps the contained value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LookupOutcome<U> {
        match self {
            Self::Success(value) => LookupOutcome::Success(f(value)),
            Self::Degraded { value, cause } => LookupOutcome::Degraded {
                value: f(value),
                cause,
            },
            Self::Failed(e) => LookupOutcome::Failed(e),
        }
    }
}
