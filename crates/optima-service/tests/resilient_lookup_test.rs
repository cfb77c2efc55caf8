//! Integration tests for the cache-aside resolver under the resilience policies.

mod common;

use common::{acme, all_kinds, bare_policy, memory_store, FailingCache, FlakyClient, GatedClient};
use optima_config::OrganisationServiceConfig;
use optima_resilience::{CircuitState, ResiliencePipeline};
use optima_service::{
    ClientKind, OrganisationClients, OrganisationResolver, ServiceInstance, StaticServiceRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE: &str = "optima-organisation-service";

fn http_clients(uri: &str) -> OrganisationClients {
    let config = OrganisationServiceConfig {
        service_name: SERVICE.to_string(),
        ..OrganisationServiceConfig::default()
    };
    let registry = Arc::new(
        StaticServiceRegistry::new().with_service(SERVICE, vec![ServiceInstance::up("org-1", uri)]),
    );
    OrganisationClients::from_config(registry, &config).unwrap()
}

fn pipeline(policy: &optima_config::PolicyConfig) -> Arc<ResiliencePipeline> {
    Arc::new(ResiliencePipeline::from_policy("organisation-service", policy))
}

#[tokio::test]
async fn test_warm_cache_never_calls_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organisation/O1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "O1",
            "name": "Acme",
            "contactEmail": "x@acme.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = OrganisationResolver::new(
        memory_store(),
        http_clients(&server.uri()),
        pipeline(&bare_policy()),
    );

    for kind in ClientKind::ALL {
        let org = resolver.resolve("O1", kind).await.unwrap();
        assert_eq!(org.name.as_deref(), Some("Acme"));
    }
}

#[tokio::test]
async fn test_cache_failure_matches_cold_cache() {
    let cold = OrganisationResolver::new(
        memory_store(),
        all_kinds(Arc::new(FlakyClient::new(0))),
        pipeline(&bare_policy()),
    );
    let broken = OrganisationResolver::new(
        Arc::new(FailingCache),
        all_kinds(Arc::new(FlakyClient::new(0))),
        pipeline(&bare_policy()),
    );

    let expected = cold.resolve("O1", ClientKind::LoadBalanced).await;
    assert_eq!(expected, Some(acme("O1")));
    assert_eq!(broken.resolve("O1", ClientKind::LoadBalanced).await, expected);
    assert_eq!(broken.resolve("O1", ClientKind::Discovery).await, expected);
}

#[tokio::test]
async fn test_open_circuit_short_circuits_without_calling_remote() {
    let mut policy = bare_policy();
    policy.circuit_breaker.enabled = true;
    policy.circuit_breaker.sliding_window_size = 4;
    policy.circuit_breaker.minimum_calls = 4;
    policy.circuit_breaker.failure_rate_threshold = 50;
    policy.circuit_breaker.wait_duration_open_ms = 60_000;

    let client = Arc::new(FlakyClient::always_failing());
    let pipeline = pipeline(&policy);
    let resolver = OrganisationResolver::new(memory_store(), all_kinds(client.clone()), pipeline.clone());

    for _ in 0..4 {
        assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
    }
    assert_eq!(client.calls(), 4);
    assert_eq!(
        pipeline.circuit_breaker().map(|b| b.state()),
        Some(CircuitState::Open)
    );

    for _ in 0..3 {
        assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
    }
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn test_bulkhead_overflow_gets_fallback() {
    let mut policy = bare_policy();
    policy.bulkhead.enabled = true;
    policy.bulkhead.max_concurrent_calls = 2;
    policy.bulkhead.max_wait_ms = 0;

    let client = Arc::new(GatedClient::new());
    let resolver = Arc::new(OrganisationResolver::new(
        memory_store(),
        all_kinds(client.clone()),
        pipeline(&policy),
    ));

    let in_flight: Vec<_> = ["O1", "O2"]
        .into_iter()
        .map(|id| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(id, ClientKind::LoadBalanced).await })
        })
        .collect();

    while client.calls() < 2 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    assert!(resolver.resolve("O3", ClientKind::LoadBalanced).await.is_none());
    assert_eq!(client.calls(), 2);

    client.gate.add_permits(2);
    for handle in in_flight {
        assert!(handle.await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_retry_recovers_after_two_failures() {
    let mut policy = bare_policy();
    policy.retry.max_attempts = 3;

    let client = Arc::new(FlakyClient::new(2));
    let resolver = OrganisationResolver::new(memory_store(), all_kinds(client.clone()), pipeline(&policy));

    assert_eq!(
        resolver.resolve("O1", ClientKind::LoadBalanced).await,
        Some(acme("O1"))
    );
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_degrades_to_none() {
    let mut policy = bare_policy();
    policy.retry.max_attempts = 2;

    let client = Arc::new(FlakyClient::new(5));
    let resolver = OrganisationResolver::new(memory_store(), all_kinds(client.clone()), pipeline(&policy));

    assert!(resolver.resolve("O1", ClientKind::LoadBalanced).await.is_none());
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_reserved_characters_in_id_stay_on_the_organisation_endpoint() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "EVIL",
            "name": "Injected"
        })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/v1/organisation/..%2Fadmin"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = OrganisationResolver::new(
        memory_store(),
        http_clients(&server.uri()),
        pipeline(&bare_policy()),
    );

    assert!(resolver.resolve("../admin", ClientKind::LoadBalanced).await.is_none());
    assert!(resolver.resolve("../admin", ClientKind::Declarative).await.is_none());
    assert!(resolver.resolve("..", ClientKind::Discovery).await.is_none());
}
