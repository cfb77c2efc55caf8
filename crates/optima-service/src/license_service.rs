//! License service trait definition.

use crate::dto::{CreateLicenseRequest, LicenseMessageResponse, UpdateLicenseRequest};
use async_trait::async_trait;
use optima_core::{License, OptimaResult};
use optima_resilience::LookupOutcome;

/// License service trait.
///
/// `locale` selects the language of user-facing messages; `None` uses the
/// configured default.
#[async_trait]
pub trait LicenseService: Send + Sync {
    /// Gets a license by organisation and id, stamped with the configured comment.
    async fn get_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        locale: Option<&str>,
    ) -> OptimaResult<License>;

    /// Gets a license and overlays organisation contact data when available.
    ///
    /// `client_mode` selects the remote lookup strategy.
    async fn get_license_enriched(
        &self,
        license_id: &str,
        organisation_id: &str,
        client_mode: &str,
        locale: Option<&str>,
    ) -> OptimaResult<License>;

    /// Creates a license with a freshly generated id.
    async fn create_license(
        &self,
        organisation_id: &str,
        request: CreateLicenseRequest,
        locale: Option<&str>,
    ) -> OptimaResult<LicenseMessageResponse>;

    /// Updates a license in place.
    async fn update_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        request: UpdateLicenseRequest,
        locale: Option<&str>,
    ) -> OptimaResult<LicenseMessageResponse>;

    /// Deletes a license and returns the confirmation message.
    async fn delete_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        locale: Option<&str>,
    ) -> OptimaResult<String>;

    /// Lists an organisation's licenses through the license-service policies.
    ///
    /// Any policy intervention yields a single placeholder license.
    async fn list_licenses(&self, organisation_id: &str) -> LookupOutcome<Vec<License>>;
}
