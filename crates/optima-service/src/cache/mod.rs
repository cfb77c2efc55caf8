//! Caching infrastructure for the service layer.
//!
//! [`CacheInterface`] is a type-erased string store with Redis and
//! in-memory implementations. [`OrganisationCache`] is the typed view the
//! organisation resolver reads and writes through.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod organisation_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::{InMemoryCacheService, DEFAULT_SWEEP_INTERVAL};
pub use organisation_cache::{CacheBackedOrganisationStore, OrganisationCache};
pub use redis_cache::RedisCacheService;

use optima_config::{CacheBackend, CacheConfig};
use optima_core::OptimaResult;
use std::sync::Arc;
use tracing::info;

/// Builds the cache selected by `config.backend`.
///
/// The Redis pool connects lazily, so an unreachable server does not
/// prevent startup; lookups treat it as a miss.
pub fn create_cache(config: &CacheConfig) -> OptimaResult<Arc<dyn CacheInterface>> {
    info!("Using '{}' organisation cache", config.backend);

    Ok(match config.backend {
        CacheBackend::Redis => Arc::new(RedisCacheService::from_config(config)?),
        CacheBackend::Memory => Arc::new(InMemoryCacheService::new()),
        CacheBackend::Disabled => Arc::new(RedisCacheService::disabled()),
    })
}
