//! Result type aliases for Optima Licensing.

use crate::OptimaError;

/// A specialized `Result` type for Optima operations.
pub type OptimaResult<T> = Result<T, OptimaError>;
