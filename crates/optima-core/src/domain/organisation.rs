//! Organisation record sourced from the remote organisation service.

use serde::{Deserialize, Serialize};

/// Organisation as returned by the remote system of record.
///
/// Cached copies are never authoritative; they are always re-fetchable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    /// Organisation identifier (primary key).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Contact person.
    #[serde(default)]
    pub contact_name: Option<String>,
    /// Contact email address.
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl Organisation {
    /// Creates an organisation with only an identifier and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
        }
    }

    /// Sets the contact fields.
    #[must_use]
    pub fn with_contact(
        mut self,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Self {
        self.contact_name = name;
        self.contact_email = email;
        self.contact_phone = phone;
        self
    }
}
