//! License service implementation.

use crate::context::UserContext;
use crate::dto::{CreateLicenseRequest, LicenseMessageResponse, UpdateLicenseRequest};
use crate::license_service::LicenseService;
use crate::resolver::OrganisationResolver;
use async_trait::async_trait;
use optima_core::{
    License, MessageSource, OptimaError, OptimaResult, ValidateExt, LICENSE_CREATE,
    LICENSE_DELETE, LICENSE_SEARCH_ERROR, LICENSE_UPDATE,
};
use optima_repository::LicenseRepository;
use optima_resilience::{FaultInjector, GuardedCall, LookupOutcome, ResiliencePipeline};
use std::sync::Arc;
use tracing::{debug, info};

/// License service backed by a [`LicenseRepository`] and an [`OrganisationResolver`].
pub struct LicenseServiceImpl {
    repository: Arc<dyn LicenseRepository>,
    resolver: Arc<OrganisationResolver>,
    messages: Arc<dyn MessageSource>,
    comment: String,
    list_guard: GuardedCall<str, Vec<License>>,
    faults: Arc<FaultInjector>,
}

impl LicenseServiceImpl {
    /// Creates a new license service.
    ///
    /// `list_pipeline` guards [`LicenseService::list_licenses`]; its fallback
    /// is a single placeholder license for the requested organisation.
    pub fn new(
        repository: Arc<dyn LicenseRepository>,
        resolver: Arc<OrganisationResolver>,
        messages: Arc<dyn MessageSource>,
        comment: impl Into<String>,
        list_pipeline: Arc<ResiliencePipeline>,
    ) -> Self {
        let list_guard =
            GuardedCall::new(list_pipeline, |organisation_id: &str, _: &OptimaError| {
                vec![License::fallback(organisation_id)]
            });

        Self {
            repository,
            resolver,
            messages,
            comment: comment.into(),
            list_guard,
            faults: Arc::new(FaultInjector::disabled()),
        }
    }

    /// Installs a fault injector on the listing path.
    #[must_use]
    pub fn with_fault_injector(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    async fn find(
        &self,
        license_id: &str,
        organisation_id: &str,
        locale: Option<&str>,
    ) -> OptimaResult<License> {
        self.repository
            .find_by_organisation_and_id(organisation_id, license_id)
            .await?
            .ok_or_else(|| {
                OptimaError::not_found_with_message(
                    "License",
                    license_id,
                    self.messages.get_message(
                        LICENSE_SEARCH_ERROR,
                        &[license_id, organisation_id],
                        locale,
                    ),
                )
            })
    }

    fn message(&self, key: &str, license: &License, locale: Option<&str>) -> String {
        self.messages.get_message(
            key,
            &[&license.license_id, &license.organisation_id],
            locale,
        )
    }
}

#[async_trait]
impl LicenseService for LicenseServiceImpl {
    async fn get_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        locale: Option<&str>,
    ) -> OptimaResult<License> {
        debug!("Getting license {} of {}", license_id, organisation_id);

        let license = self.find(license_id, organisation_id, locale).await?;
        Ok(license.with_comment(self.comment.as_str()))
    }

    async fn get_license_enriched(
        &self,
        license_id: &str,
        organisation_id: &str,
        client_mode: &str,
        locale: Option<&str>,
    ) -> OptimaResult<License> {
        let mut license = self.find(license_id, organisation_id, locale).await?;

        match self
            .resolver
            .resolve_with_mode(organisation_id, client_mode)
            .await
        {
            Some(organisation) => license.enrich(&organisation),
            None => debug!(
                "No organisation data for {}; returning license {} unenriched",
                organisation_id, license_id
            ),
        }

        Ok(license.with_comment(self.comment.as_str()))
    }

    async fn create_license(
        &self,
        organisation_id: &str,
        request: CreateLicenseRequest,
        locale: Option<&str>,
    ) -> OptimaResult<LicenseMessageResponse> {
        let request = request.trimmed();
        request.validate_request()?;

        let license = License::new(
            organisation_id,
            request.product_name,
            request.license_type,
            request.description,
        );
        let license = self.repository.save(&license).await?;

        info!(
            "Created license {} for organisation {}",
            license.license_id, organisation_id
        );

        let message = self.message(LICENSE_CREATE, &license, locale);
        Ok(LicenseMessageResponse { license, message })
    }

    async fn update_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        request: UpdateLicenseRequest,
        locale: Option<&str>,
    ) -> OptimaResult<LicenseMessageResponse> {
        let request = request.trimmed();
        request.validate_request()?;

        let mut license = self.find(license_id, organisation_id, locale).await?;
        request.apply(&mut license);
        let license = self.repository.save(&license).await?;

        info!(
            "Updated license {} for organisation {}",
            license_id, organisation_id
        );

        let message = self.message(LICENSE_UPDATE, &license, locale);
        Ok(LicenseMessageResponse { license, message })
    }

    async fn delete_license(
        &self,
        license_id: &str,
        organisation_id: &str,
        locale: Option<&str>,
    ) -> OptimaResult<String> {
        let license = self.find(license_id, organisation_id, locale).await?;
        self.repository.delete(organisation_id, license_id).await?;

        info!(
            "Deleted license {} for organisation {}",
            license_id, organisation_id
        );

        Ok(self.message(LICENSE_DELETE, &license, locale))
    }

    async fn list_licenses(&self, organisation_id: &str) -> LookupOutcome<Vec<License>> {
        let correlation_id = UserContext::current_correlation_id().unwrap_or_default();
        debug!(
            correlation_id = %correlation_id,
            "Listing licenses for organisation {}", organisation_id
        );

        let repository = &self.repository;
        let faults = &self.faults;
        self.list_guard
            .execute(organisation_id, move || async move {
                faults.maybe_inject("list_licenses").await?;
                repository.find_all_by_organisation(organisation_id).await
            })
            .await
    }
}
