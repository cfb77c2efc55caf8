//! Cache-aside organisation resolver.

use crate::cache::OrganisationCache;
use crate::clients::{ClientKind, OrganisationClients};
use crate::metrics::ServiceMetrics;
use optima_core::{OptimaError, Organisation};
use optima_resilience::{GuardedCall, LookupOutcome, ResiliencePipeline};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Resolves organisations from the cache, falling back to a remote client.
///
/// Cache failures are logged and never reach the caller. A missing or
/// unreachable organisation resolves to `None`.
pub struct OrganisationResolver {
    cache: Arc<dyn OrganisationCache>,
    clients: OrganisationClients,
    guard: GuardedCall<str, Option<Organisation>>,
}

impl OrganisationResolver {
    /// Creates a resolver whose remote calls run through `pipeline`.
    pub fn new(
        cache: Arc<dyn OrganisationCache>,
        clients: OrganisationClients,
        pipeline: Arc<ResiliencePipeline>,
    ) -> Self {
        let guard = GuardedCall::new(pipeline, |organisation_id: &str, cause: &OptimaError| {
            debug!(
                "No organisation for {} while degraded: {}",
                organisation_id, cause
            );
            None
        });

        Self {
            cache,
            clients,
            guard,
        }
    }

    /// Returns the pipeline guarding remote calls.
    pub fn pipeline(&self) -> &Arc<ResiliencePipeline> {
        self.guard.pipeline()
    }

    /// Resolves using the client selected by a caller-supplied mode.
    pub async fn resolve_with_mode(&self, organisation_id: &str, mode: &str) -> Option<Organisation> {
        let kind = self.clients.kind_for_mode(mode);
        self.resolve(organisation_id, kind).await
    }

    /// Resolves `organisation_id`, reading through the cache.
    pub async fn resolve(&self, organisation_id: &str, kind: ClientKind) -> Option<Organisation> {
        match self.cache.get(organisation_id).await {
            Ok(Some(organisation)) => {
                debug!("Organisation {} served from cache", organisation_id);
                ServiceMetrics::cache_hit();
                return Some(organisation);
            }
            Ok(None) => {
                debug!("Organisation {} not cached", organisation_id);
                ServiceMetrics::cache_miss();
            }
            Err(e) => {
                error!(
                    "Unable to read organisation {} from cache: {}",
                    organisation_id, e
                );
                ServiceMetrics::cache_error("get");
            }
        }

        let client = self.clients.get(kind);
        let outcome = self
            .guard
            .execute(organisation_id, || client.fetch(organisation_id))
            .await;

        let organisation = match outcome {
            LookupOutcome::Success(organisation) => organisation,
            LookupOutcome::Degraded { value, .. } => value,
            LookupOutcome::Failed(e) => {
                warn!(
                    "Organisation lookup for {} via {} failed: {}",
                    organisation_id, kind, e
                );
                None
            }
        }?;

        if let Err(e) = self.cache.put(organisation_id, &organisation).await {
            error!(
                "Unable to cache organisation {}: {}",
                organisation_id, e
            );
            ServiceMetrics::cache_error("put");
        }

        Some(organisation)
    }
}

impl std::fmt::Debug for OrganisationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganisationResolver")
            .field("clients", &self.clients)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{cache_keys, CacheBackedOrganisationStore, InMemoryCacheService};
    use crate::clients::{MockOrganisationClient, OrganisationClient};
    use async_trait::async_trait;
    use optima_core::OptimaResult;
    use optima_resilience::{CircuitBreaker, CircuitBreakerConfig};
    use std::time::Duration;

    struct FailingCache;

    #[async_trait]
    impl OrganisationCache for FailingCache {
        async fn get(&self, _: &str) -> OptimaResult<Option<Organisation>> {
            Err(OptimaError::Cache("connection refused".into()))
        }

        async fn put(&self, _: &str, _: &Organisation) -> OptimaResult<()> {
            Err(OptimaError::Cache("connection refused".into()))
        }
    }

    fn acme() -> Organisation {
        Organisation::new("O1", "Acme").with_contact(None, Some("x@acme.com".into()), None)
    }

    fn memory_cache() -> Arc<dyn OrganisationCache> {
        Arc::new(CacheBackedOrganisationStore::new(
            Arc::new(InMemoryCacheService::new()),
            cache_keys::DEFAULT_PREFIX,
            Duration::from_secs(60),
        ))
    }

    fn unused() -> Arc<dyn OrganisationClient> {
        Arc::new(MockOrganisationClient::new())
    }

    fn with_load_balanced(client: MockOrganisationClient) -> OrganisationClients {
        OrganisationClients::new(unused(), Arc::new(client), unused())
    }

    fn open_pipeline() -> Arc<ResiliencePipeline> {
        Arc::new(ResiliencePipeline::builder("organisation-service").build())
    }

    #[tokio::test]
    async fn test_miss_fetches_then_hits_cache() {
        let mut client = MockOrganisationClient::new();
        client
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Some(acme())));

        let resolver = OrganisationResolver::new(
            memory_cache(),
            with_load_balanced(client),
            open_pipeline(),
        );

        let first = resolver.resolve("O1", ClientKind::LoadBalanced).await;
        let second = resolver.resolve("O1", ClientKind::LoadBalanced).await;

        assert_eq!(first, Some(acme()));
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_warm_cache_never_calls_remote() {
        let cache = memory_cache();
        cache.put("O1", &acme()).await.unwrap();

        let resolver = OrganisationResolver::new(
            cache,
            with_load_balanced(MockOrganisationClient::new()),
            open_pipeline(),
        );

        for _ in 0..3 {
            assert_eq!(resolver.resolve("O1", ClientKind::LoadBalanced).await, Some(acme()));
        }
    }

    #[tokio::test]
    async fn test_cache_failure_is_transparent() {
        let mut client = MockOrganisationClient::new();
        client.expect_fetch().returning(|_| Ok(Some(acme())));

        let resolver = OrganisationResolver::new(
            Arc::new(FailingCache),
            with_load_balanced(client),
            open_pipeline(),
        );

        assert_eq!(resolver.resolve("O1", ClientKind::LoadBalanced).await, Some(acme()));
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let mut client = MockOrganisationClient::new();
        client.expect_fetch().times(2).returning(|_| Ok(None));

        let resolver = OrganisationResolver::new(
            memory_cache(),
            with_load_balanced(client),
            open_pipeline(),
        );

        assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
        assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
    }

    #[tokio::test]
    async fn test_remote_error_resolves_to_none() {
        let mut client = MockOrganisationClient::new();
        client
            .expect_fetch()
            .returning(|_| Err(OptimaError::remote_rejected("org", "400")));

        let resolver = OrganisationResolver::new(
            memory_cache(),
            with_load_balanced(client),
            open_pipeline(),
        );

        assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
    }

    #[tokio::test]
    async fn test_open_breaker_skips_remote() {
        let mut client = MockOrganisationClient::new();
        client
            .expect_fetch()
            .times(2)
            .returning(|_| Err(OptimaError::remote_unavailable("org", "503")));

        let pipeline = ResiliencePipeline::builder("organisation-service")
            .circuit_breaker(CircuitBreaker::new(
                "organisation-service",
                CircuitBreakerConfig {
                    failure_rate_threshold: 50.0,
                    sliding_window_size: 2,
                    minimum_calls: 2,
                    wait_duration_open: Duration::from_secs(60),
                    permitted_calls_half_open: 1,
                },
            ))
            .build();

        let resolver = OrganisationResolver::new(
            memory_cache(),
            with_load_balanced(client),
            Arc::new(pipeline),
        );

        for _ in 0..4 {
            assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_mode_selects_client() {
        let mut discovery = MockOrganisationClient::new();
        discovery
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Some(acme())));

        let clients = OrganisationClients::new(Arc::new(discovery), unused(), unused());
        let resolver = OrganisationResolver::new(memory_cache(), clients, open_pipeline());

        assert!(resolver.resolve_with_mode("O1", "discovery").await.is_some());
    }
}
