//! String-valued cache abstraction shared by every backend.

use async_trait::async_trait;
use optima_core::{OptimaError, OptimaResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// A key-value store of JSON strings with per-entry expiry.
///
/// Backends report every failure as [`OptimaError::Cache`]. A disabled
/// backend answers every read with `None` and drops every write.
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get_raw(&self, key: &str) -> OptimaResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> OptimaResult<()>;

    /// Returns false for the no-op backend.
    fn is_enabled(&self) -> bool;
}

/// Typed access on top of [`CacheInterface`].
///
/// Entries that cannot be decoded surface as [`OptimaError::Cache`], the
/// same as a backend failure.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Reads and decodes the value under `key`.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> OptimaResult<Option<T>> {
        let Some(json) = self.get_raw(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| OptimaError::Cache(format!("Undecodable entry '{}': {}", key, e)))
    }

    /// Encodes and stores `value` under `key`.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> OptimaResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| OptimaError::Cache(format!("Unencodable entry '{}': {}", key, e)))?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
