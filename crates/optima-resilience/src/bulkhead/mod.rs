//! Semaphore bulkhead capping concurrently in-flight calls.

use optima_config::BulkheadSettings;
use optima_core::{OptimaError, OptimaResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of concurrent calls to an operation.
///
/// With a zero `max_wait` excess calls are rejected immediately; otherwise
/// they wait up to `max_wait` for a permit.
#[derive(Debug, Clone)]
pub struct Bulkhead {
    name: String,
    semaphore: Arc<Semaphore>,
    max_concurrent_calls: usize,
    max_wait: Duration,
}

impl Bulkhead {
    /// Creates a bulkhead.
    pub fn new(name: impl Into<String>, max_concurrent_calls: usize, max_wait: Duration) -> Self {
        let max_concurrent_calls = max_concurrent_calls.max(1);
        Self {
            name: name.into(),
            semaphore: Arc::new(Semaphore::new(max_concurrent_calls)),
            max_concurrent_calls,
            max_wait,
        }
    }

    /// Creates a bulkhead from configuration.
    pub fn from_settings(name: impl Into<String>, settings: &BulkheadSettings) -> Self {
        Self::new(name, settings.max_concurrent_calls, settings.max_wait())
    }

    /// Returns the configured capacity.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_concurrent_calls
    }

    /// Returns the number of free permits.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Acquires a permit held until the returned guard is dropped.
    pub async fn acquire(&self) -> OptimaResult<OwnedSemaphorePermit> {
        if self.max_wait.is_zero() {
            return Arc::clone(&self.semaphore)
                .try_acquire_owned()
                .map_err(|_| self.full());
        }

        match tokio::time::timeout(self.max_wait, Arc::clone(&self.semaphore).acquire_owned())
            .await
        {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => Err(self.full()),
        }
    }

    fn full(&self) -> OptimaError {
        OptimaError::BulkheadFull(self.name.clone())
    }
}
