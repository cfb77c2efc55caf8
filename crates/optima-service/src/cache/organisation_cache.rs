//! Typed organisation store on top of [`CacheInterface`].

use super::{cache_keys, CacheExt, CacheInterface};
use async_trait::async_trait;
use optima_config::CacheConfig;
use optima_core::{Organisation, OptimaResult};
use std::sync::Arc;
use std::time::Duration;

/// Key-value store of organisations by identifier.
///
/// Errors are returned to the caller; the resolver decides whether to
/// swallow them.
#[async_trait]
pub trait OrganisationCache: Send + Sync {
    /// Returns the cached organisation, or `None` on a miss.
    async fn get(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>>;

    /// Stores `organisation` under `organisation_id`. Last write wins.
    async fn put(&self, organisation_id: &str, organisation: &Organisation) -> OptimaResult<()>;
}

/// [`OrganisationCache`] that serializes organisations as JSON.
pub struct CacheBackedOrganisationStore {
    cache: Arc<dyn CacheInterface>,
    key_prefix: String,
    ttl: Duration,
}

impl CacheBackedOrganisationStore {
    /// Creates a store over `cache`.
    pub fn new(cache: Arc<dyn CacheInterface>, key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    /// Creates a store using the prefix and TTL from configuration.
    pub fn from_config(cache: Arc<dyn CacheInterface>, config: &CacheConfig) -> Self {
        Self::new(cache, config.key_prefix.clone(), config.ttl())
    }

    fn key(&self, organisation_id: &str) -> String {
        cache_keys::organisation(&self.key_prefix, organisation_id)
    }
}

#[async_trait]
impl OrganisationCache for CacheBackedOrganisationStore {
    async fn get(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>> {
        self.cache.get(&self.key(organisation_id)).await
    }

    async fn put(&self, organisation_id: &str, organisation: &Organisation) -> OptimaResult<()> {
        self.cache
            .set(&self.key(organisation_id), organisation, self.ttl)
            .await
    }
}

impl std::fmt::Debug for CacheBackedOrganisationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBackedOrganisationStore")
            .field("key_prefix", &self.key_prefix)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
