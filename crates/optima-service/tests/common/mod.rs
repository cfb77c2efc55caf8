//! Shared doubles and fixtures for the service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use optima_config::PolicyConfig;
use optima_core::{License, OptimaError, OptimaResult, Organisation};
use optima_repository::LicenseRepository;
use optima_service::{
    cache_keys, CacheBackedOrganisationStore, ClientKind, InMemoryCacheService, OrganisationCache,
    OrganisationClient, OrganisationClients,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub fn acme(id: &str) -> Organisation {
    Organisation::new(id, "Acme").with_contact(
        Some("Wile E.".to_string()),
        Some("x@acme.com".to_string()),
        Some("555-0100".to_string()),
    )
}

pub fn memory_store() -> Arc<dyn OrganisationCache> {
    Arc::new(CacheBackedOrganisationStore::new(
        Arc::new(InMemoryCacheService::new()),
        cache_keys::DEFAULT_PREFIX,
        Duration::from_secs(60),
    ))
}

/// Uses `client` for every strategy.
pub fn all_kinds(client: Arc<dyn OrganisationClient>) -> OrganisationClients {
    OrganisationClients::new(client.clone(), client.clone(), client)
}

/// Policy config with every admission policy disabled and a single attempt.
pub fn bare_policy() -> PolicyConfig {
    let mut policy = PolicyConfig::default();
    policy.circuit_breaker.enabled = false;
    policy.rate_limiter.enabled = false;
    policy.bulkhead.enabled = false;
    policy.retry.max_attempts = 1;
    policy.retry.initial_backoff_ms = 1;
    policy.retry.max_backoff_ms = 2;
    policy.retry.jitter = false;
    policy.timeout_ms = 0;
    policy
}

/// Fails with a retryable error for the first `failures` calls, then succeeds.
pub struct FlakyClient {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyClient {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrganisationClient for FlakyClient {
    async fn fetch(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(OptimaError::remote_unavailable(
                "optima-organisation-service",
                "503 Service Unavailable",
            ))
        } else {
            Ok(Some(acme(organisation_id)))
        }
    }

    fn kind(&self) -> ClientKind {
        ClientKind::LoadBalanced
    }
}

/// Blocks every call until a permit is added to `gate`.
pub struct GatedClient {
    pub gate: Semaphore,
    calls: AtomicU32,
}

impl GatedClient {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrganisationClient for GatedClient {
    async fn fetch(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| OptimaError::internal(e.to_string()))?;
        Ok(Some(acme(organisation_id)))
    }

    fn kind(&self) -> ClientKind {
        ClientKind::LoadBalanced
    }
}

/// Cache whose every operation fails.
pub struct FailingCache;

#[async_trait]
impl OrganisationCache for FailingCache {
    async fn get(&self, _: &str) -> OptimaResult<Option<Organisation>> {
        Err(OptimaError::Cache("Failed to get Redis connection".into()))
    }

    async fn put(&self, _: &str, _: &Organisation) -> OptimaResult<()> {
        Err(OptimaError::Cache("Failed to get Redis connection".into()))
    }
}

/// Repository whose listing query fails with a retryable database error.
pub struct UnavailableListing<R> {
    pub inner: R,
    listings: AtomicU32,
}

impl<R> UnavailableListing<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            listings: AtomicU32::new(0),
        }
    }

    pub fn listings(&self) -> u32 {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: LicenseRepository> LicenseRepository for UnavailableListing<R> {
    async fn find_by_organisation_and_id(
        &self,
        organisation_id: &str,
        license_id: &str,
    ) -> OptimaResult<Option<License>> {
        self.inner
            .find_by_organisation_and_id(organisation_id, license_id)
            .await
    }

    async fn find_all_by_organisation(&self, _: &str) -> OptimaResult<Vec<License>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Err(OptimaError::Database("connection reset".into()))
    }

    async fn save(&self, license: &License) -> OptimaResult<License> {
        self.inner.save(license).await
    }

    async fn delete(&self, organisation_id: &str, license_id: &str) -> OptimaResult<bool> {
        self.inner.delete(organisation_id, license_id).await
    }
}
