//! Redis-backed organisation cache storage.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use optima_config::CacheConfig;
use optima_core::{OptimaError, OptimaResult};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, info};

/// Creates a Redis connection pool. Connections are opened on first use.
fn create_pool(config: &CacheConfig) -> OptimaResult<Pool> {
    info!("Creating Redis connection pool for organisation cache");

    Config::from_url(&config.redis_url)
        .builder()
        .map_err(|e| OptimaError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| OptimaError::Configuration(format!("Failed to create Redis pool: {}", e)))
}

fn redis_error(action: &str, key: &str, error: impl Display) -> OptimaError {
    OptimaError::Cache(format!("Redis {} of '{}' failed: {}", action, key, error))
}

/// [`CacheInterface`] over a Redis pool.
///
/// Without a pool every read misses and every write is dropped.
#[derive(Clone)]
pub struct RedisCacheService {
    pool: Option<Pool>,
}

impl RedisCacheService {
    /// Connects lazily to the server named in `config`.
    pub fn from_config(config: &CacheConfig) -> OptimaResult<Self> {
        Ok(Self {
            pool: Some(create_pool(config)?),
        })
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn connection(&self, key: &str) -> OptimaResult<Option<Connection>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        pool.get()
            .await
            .map(Some)
            .map_err(|e| redis_error("connection", key, e))
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> OptimaResult<Option<String>> {
        let Some(mut conn) = self.connection(key).await? else {
            return Ok(None);
        };

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| redis_error("GET", key, e))?;

        debug!(key, hit = value.is_some(), "Redis cache lookup");
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> OptimaResult<()> {
        let Some(mut conn) = self.connection(key).await? else {
            return Ok(());
        };

        // SETEX rejects a zero expiry.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| redis_error("SETEX", key, e))?;

        debug!(key, ttl_secs, "Redis cache write");
        Ok(())
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
