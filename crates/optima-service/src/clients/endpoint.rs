//! Resolution of a logical service name to a base URL.

use super::ServiceRegistry;
use async_trait::async_trait;
use optima_core::OptimaResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Picks the base URL to call for a logical service name.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Returns a base URL, or `None` when no instance is live.
    async fn resolve(&self, service_name: &str) -> OptimaResult<Option<String>>;
}

/// Always picks the first `Up` instance in registry order.
pub struct FirstUpResolver {
    registry: Arc<dyn ServiceRegistry>,
}

impl FirstUpResolver {
    /// Creates a resolver over `registry`.
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl EndpointResolver for FirstUpResolver {
    async fn resolve(&self, service_name: &str) -> OptimaResult<Option<String>> {
        Ok(self
            .registry
            .instances(service_name)
            .await?
            .into_iter()
            .find(|instance| instance.is_up())
            .map(|instance| instance.uri))
    }
}

/// Rotates across `Up` instances.
pub struct RoundRobinResolver {
    registry: Arc<dyn ServiceRegistry>,
    next: AtomicUsize,
}

impl RoundRobinResolver {
    /// Creates a resolver over `registry`.
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            registry,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EndpointResolver for RoundRobinResolver {
    async fn resolve(&self, service_name: &str) -> OptimaResult<Option<String>> {
        let mut live = self
            .registry
            .instances(service_name)
            .await?
            .into_iter()
            .filter(|instance| instance.is_up())
            .collect::<Vec<_>>();

        if live.is_empty() {
            return Ok(None);
        }

        let index = self.next.fetch_add(1, Ordering::Relaxed) % live.len();
        Ok(Some(live.swap_remove(index).uri))
    }
}
