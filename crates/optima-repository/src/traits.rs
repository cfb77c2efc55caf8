//! Repository trait definitions.

use async_trait::async_trait;
use optima_core::{License, OptimaResult};

/// License repository trait.
#[async_trait]
pub trait LicenseRepository: Send + Sync {
    /// Finds a license by organisation and license id.
    async fn find_by_organisation_and_id(
        &self,
        organisation_id: &str,
        license_id: &str,
    ) -> OptimaResult<Option<License>>;

    /// Finds every license of an organisation.
    async fn find_all_by_organisation(&self, organisation_id: &str) -> OptimaResult<Vec<License>>;

    /// Inserts or replaces a license.
    async fn save(&self, license: &License) -> OptimaResult<License>;

    /// Deletes a license. Returns false if it did not exist.
    async fn delete(&self, organisation_id: &str, license_id: &str) -> OptimaResult<bool>;
}
