//! In-process cache with per-entry expiry.

use super::CacheInterface;
use async_trait::async_trait;
use optima_core::{OptimaError, OptimaResult};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default interval between sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Cache held in process memory.
///
/// Expired entries are dropped when read, and writes sweep the whole map
/// at most once per sweep interval so that keys never read again do not
/// accumulate.
#[derive(Debug)]
pub struct InMemoryCacheService {
    entries: RwLock<HashMap<String, Entry>>,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for InMemoryCacheService {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl InMemoryCacheService {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache sweeping expired entries every `sweep_interval`.
    #[must_use]
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sweep_interval,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired_at(now))
            .count()
    }

    /// Returns true if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of stored entries, expired or not.
    #[must_use]
    pub fn stored(&self) -> usize {
        self.entries.read().len()
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        *self.last_sweep.lock() = now;

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Swept {} expired cache entries", removed);
        }
        removed
    }

    fn sweep_due(&self) -> bool {
        self.last_sweep.lock().elapsed() >= self.sweep_interval
    }
}

#[async_trait]
impl CacheInterface for InMemoryCacheService {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> OptimaResult<Option<String>> {
        let now = Instant::now();
        let expired = match self.entries.read().get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                debug!("Cache hit for key '{}'", key);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.write().remove(key);
        }
        debug!("Cache miss for key '{}'", key);
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> OptimaResult<()> {
        let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
            OptimaError::Cache(format!("TTL {:?} for key '{}' is out of range", ttl, key))
        })?;

        if self.sweep_due() {
            self.purge_expired();
        }

        self.entries.write().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
