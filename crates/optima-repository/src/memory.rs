//! In-memory license store.

use crate::LicenseRepository;
use async_trait::async_trait;
use optima_core::{License, OptimaResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

type LicenseKey = (String, String);

/// License store keyed by `(organisation_id, license_id)`.
///
/// Listing returns licenses ordered by license id.
#[derive(Debug, Default)]
pub struct InMemoryLicenseRepository {
    licenses: RwLock<BTreeMap<LicenseKey, License>>,
}

impl InMemoryLicenseRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `licenses`.
    #[must_use]
    pub fn with_licenses(licenses: impl IntoIterator<Item = License>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.licenses.write();
            for license in licenses {
                map.insert(key(&license.organisation_id, &license.license_id), license);
            }
        }
        repo
    }

    /// Returns the number of stored licenses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.licenses.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.licenses.read().is_empty()
    }
}

fn key(organisation_id: &str, license_id: &str) -> LicenseKey {
    (organisation_id.to_string(), license_id.to_string())
}

#[async_trait]
impl LicenseRepository for InMemoryLicenseRepository {
    async fn find_by_organisation_and_id(
        &self,
        organisation_id: &str,
        license_id: &str,
    ) -> OptimaResult<Option<License>> {
        debug!("Repository: find license {} of {}", license_id, organisation_id);
        Ok(self
            .licenses
            .read()
            .get(&key(organisation_id, license_id))
            .cloned())
    }

    async fn find_all_by_organisation(&self, organisation_id: &str) -> OptimaResult<Vec<License>> {
        debug!("Repository: find all licenses of {}", organisation_id);
        Ok(self
            .licenses
            .read()
            .iter()
            .filter(|((org, _), _)| org == organisation_id)
            .map(|(_, license)| license.clone())
            .collect())
    }

    async fn save(&self, license: &License) -> OptimaResult<License> {
        debug!(
            "Repository: save license {} of {}",
            license.license_id, license.organisation_id
        );
        self.licenses.write().insert(
            key(&license.organisation_id, &license.license_id),
            license.clone(),
        );
        Ok(license.clone())
    }

    async fn delete(&self, organisation_id: &str, license_id: &str) -> OptimaResult<bool> {
        debug!("Repository: delete license {} of {}", license_id, organisation_id);
        Ok(self
            .licenses
            .write()
            .remove(&key(organisation_id, license_id))
            .is_some())
    }
}
