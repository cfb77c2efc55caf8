//! Component wiring.
//!
//! Every component is built once from the loaded [`AppConfig`] and shared
//! through `Arc`s. Collaborators that tests or alternative deployments need
//! to replace can be supplied on the [`AppModuleBuilder`].

use optima_config::AppConfig;
use optima_core::{MessageSource, OptimaError, OptimaResult, StaticMessageSource};
use optima_repository::{InMemoryLicenseRepository, LicenseRepository};
use optima_resilience::{FaultInjector, ResiliencePipeline};
use optima_service::{
    create_cache, CacheBackedOrganisationStore, CacheInterface, LicenseService,
    LicenseServiceImpl, OrganisationClients, OrganisationResolver, ServiceRegistry,
    StaticServiceRegistry,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Pipeline name for license listing.
pub const LICENSE_PIPELINE: &str = "license-service";
/// Pipeline name for remote organisation lookups.
pub const ORGANISATION_PIPELINE: &str = "organisation-service";

/// Fully wired application components.
pub struct AppModule {
    config: Arc<AppConfig>,
    license_service: Arc<dyn LicenseService>,
    resolver: Arc<OrganisationResolver>,
    license_pipeline: Arc<ResiliencePipeline>,
    organisation_pipeline: Arc<ResiliencePipeline>,
}

impl AppModule {
    /// Returns the configuration the module was built from.
    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// Returns the license service.
    pub fn license_service(&self) -> Arc<dyn LicenseService> {
        self.license_service.clone()
    }

    /// Returns the organisation resolver.
    pub fn resolver(&self) -> Arc<OrganisationResolver> {
        self.resolver.clone()
    }

    /// Returns the pipeline guarding license listing.
    pub fn license_pipeline(&self) -> &Arc<ResiliencePipeline> {
        &self.license_pipeline
    }

    /// Returns the pipeline guarding organisation lookups.
    pub fn organisation_pipeline(&self) -> &Arc<ResiliencePipeline> {
        &self.organisation_pipeline
    }
}

/// Builder for [`AppModule`].
#[derive(Default)]
pub struct AppModuleBuilder {
    config: Option<Arc<AppConfig>>,
    repository: Option<Arc<dyn LicenseRepository>>,
    registry: Option<Arc<dyn ServiceRegistry>>,
    cache: Option<Arc<dyn CacheInterface>>,
}

impl AppModuleBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: Arc<AppConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the license store.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn LicenseRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Replaces the configured service registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the configured cache backend.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheInterface>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the module.
    pub fn build(self) -> OptimaResult<AppModule> {
        let config = self.config.unwrap_or_default();

        let cache = match self.cache {
            Some(cache) => cache,
            None => create_cache(&config.cache)?,
        };
        let registry: Arc<dyn ServiceRegistry> = match self.registry {
            Some(registry) => registry,
            None => Arc::new(StaticServiceRegistry::from_config(
                &config.organisation_service,
            )),
        };
        let repository: Arc<dyn LicenseRepository> = match self.repository {
            Some(repository) => repository,
            None => Arc::new(InMemoryLicenseRepository::new()),
        };

        let organisation_pipeline = Arc::new(ResiliencePipeline::from_policy(
            ORGANISATION_PIPELINE,
            &config.resilience.organisation_service,
        ));
        let license_pipeline = Arc::new(ResiliencePipeline::from_policy(
            LICENSE_PIPELINE,
            &config.resilience.license_service,
        ));

        let resolver = Arc::new(OrganisationResolver::new(
            Arc::new(CacheBackedOrganisationStore::from_config(cache, &config.cache)),
            OrganisationClients::from_config(registry, &config.organisation_service)?,
            organisation_pipeline.clone(),
        ));

        let license_service = LicenseServiceImpl::new(
            repository,
            resolver.clone(),
            build_message_source(&config)?,
            config.licensing.comment.clone(),
            license_pipeline.clone(),
        )
        .with_fault_injector(Arc::new(FaultInjector::from_config(&config.fault_injection)));

        info!("Application components wired");

        Ok(AppModule {
            config,
            license_service: Arc::new(license_service),
            resolver,
            license_pipeline,
            organisation_pipeline,
        })
    }
}

/// Builds the message source, overlaying the configured bundle file if any.
pub fn build_message_source(config: &AppConfig) -> OptimaResult<Arc<dyn MessageSource>> {
    let source = StaticMessageSource::with_defaults(&config.messages.default_locale);

    let source = match &config.messages.bundle_path {
        Some(path) => {
            info!("Loading message bundle from {}", path);
            source.merge_toml(&read_bundle(Path::new(path))?)?
        }
        None => source,
    };

    Ok(Arc::new(source))
}

fn read_bundle(path: &Path) -> OptimaResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        OptimaError::Configuration(format!(
            "Failed to read message bundle {}: {}",
            path.display(),
            e
        ))
    })
}
