//! Validation utilities.

use crate::{FieldError, OptimaError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns an `OptimaError` on failure.
    fn validate_request(&self) -> Result<(), OptimaError> {
        self.validate().map_err(validation_errors_to_optima_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `OptimaError`.
#[must_use]
pub fn validation_errors_to_optima_error(errors: ValidationErrors) -> OptimaError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    OptimaError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct NamedRequest {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let request = NamedRequest { name: String::new() };
        let err = request.validate_request().unwrap_err();
        match err {
            OptimaError::Validation(msg) => assert!(msg.contains("name")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_field_passes() {
        let request = NamedRequest { name: "Acme".to_string() };
        assert!(request.validate_request().is_ok());
    }
}
