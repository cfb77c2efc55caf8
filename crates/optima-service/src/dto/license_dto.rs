//! License-related DTOs.

use optima_core::License;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLicenseRequest {
    #[validate(length(min = 1, max = 128, message = "Product name must be 1-128 characters"))]
    pub product_name: String,

    #[validate(length(min = 1, max = 32, message = "License type must be 1-32 characters"))]
    pub license_type: String,

    #[validate(length(max = 1024))]
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateLicenseRequest {
    /// Creates a request.
    pub fn new(
        product_name: impl Into<String>,
        license_type: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            license_type: license_type.into(),
            description,
        }
    }

    /// Returns the request with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            product_name: self.product_name.trim().to_string(),
            license_type: self.license_type.trim().to_string(),
            description: self.description.map(|d| d.trim().to_string()),
        }
    }
}

/// Request to update a license. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLicenseRequest {
    #[validate(length(min = 1, max = 128, message = "Product name must be 1-128 characters"))]
    #[serde(default)]
    pub product_name: Option<String>,

    #[validate(length(min = 1, max = 32, message = "License type must be 1-32 characters"))]
    #[serde(default)]
    pub license_type: Option<String>,

    #[validate(length(max = 1024))]
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateLicenseRequest {
    /// Returns the request with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed(self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            product_name: trim(self.product_name),
            license_type: trim(self.license_type),
            description: trim(self.description),
        }
    }

    /// Applies the present fields to `license`.
    pub fn apply(self, license: &mut License) {
        if let Some(product_name) = self.product_name {
            license.product_name = product_name;
        }
        if let Some(license_type) = self.license_type {
            license.license_type = license_type;
        }
        if self.description.is_some() {
            license.description = self.description;
        }
    }
}

/// A license together with a localized confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseMessageResponse {
    pub license: License,
    pub message: String,
}
