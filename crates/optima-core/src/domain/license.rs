//! License entity.

use crate::Organisation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier carried by the degraded placeholder license.
pub const FALLBACK_LICENSE_ID: &str = "0000000-00-00000";

/// Product name carried by the degraded placeholder license.
pub const FALLBACK_PRODUCT_NAME: &str = "Sorry no licensing information currently available";

/// A license record owned by an organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// License identifier, unique within the organisation.
    pub license_id: String,
    /// Owning organisation identifier.
    pub organisation_id: String,
    /// Licensed product.
    pub product_name: String,
    /// License type (e.g. "full", "trial").
    pub license_type: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Configuration-sourced comment stamped on reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Organisation display name (enrichment only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_name: Option<String>,
    /// Organisation contact name (enrichment only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Organisation contact email (enrichment only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Organisation contact phone (enrichment only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl License {
    /// Creates a new license with a freshly generated identifier.
    pub fn new(
        organisation_id: impl Into<String>,
        product_name: impl Into<String>,
        license_type: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            license_id: Uuid::new_v4().to_string(),
            organisation_id: organisation_id.into(),
            product_name: product_name.into(),
            license_type: license_type.into(),
            description,
            comment: None,
            organisation_name: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    /// Placeholder returned when license data cannot be served.
    pub fn fallback(organisation_id: impl Into<String>) -> Self {
        Self {
            license_id: FALLBACK_LICENSE_ID.to_string(),
            organisation_id: organisation_id.into(),
            product_name: FALLBACK_PRODUCT_NAME.to_string(),
            license_type: String::new(),
            description: None,
            comment: None,
            organisation_name: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    /// Returns true if this is the degraded placeholder.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.license_id == FALLBACK_LICENSE_ID
    }

    /// Stamps the comment onto the license.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Overlays organisation name and contact fields.
    pub fn enrich(&mut self, organisation: &Organisation) {
        self.organisation_name.clone_from(&organisation.name);
        self.contact_name.clone_from(&organisation.contact_name);
        self.contact_email.clone_from(&organisation.contact_email);
        self.contact_phone.clone_from(&organisation.contact_phone);
    }
}
