//! End-to-end tests for the license service.

mod common;

use common::{bare_policy, memory_store, UnavailableListing};
use optima_config::{FaultInjectionConfig, OrganisationServiceConfig, PolicyConfig};
use optima_core::{License, OptimaError, StaticMessageSource, FALLBACK_LICENSE_ID};
use optima_repository::{InMemoryLicenseRepository, LicenseRepository};
use optima_resilience::{FaultInjector, ResiliencePipeline};
use optima_service::{
    CreateLicenseRequest, LicenseService, LicenseServiceImpl, OrganisationClients,
    OrganisationResolver, ServiceInstance, StaticServiceRegistry, UserContext,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE: &str = "optima-organisation-service";

fn l1() -> License {
    License {
        license_id: "L1".to_string(),
        ..License::new("O1", "Ostock", "full", Some("Software product".to_string()))
    }
}

fn service(organisation_uri: &str, license_policy: &PolicyConfig) -> LicenseServiceImpl {
    service_over(
        Arc::new(InMemoryLicenseRepository::with_licenses([l1()])),
        organisation_uri,
        license_policy,
    )
}

fn service_over(
    repository: Arc<dyn LicenseRepository>,
    organisation_uri: &str,
    license_policy: &PolicyConfig,
) -> LicenseServiceImpl {
    let config = OrganisationServiceConfig {
        service_name: SERVICE.to_string(),
        ..OrganisationServiceConfig::default()
    };
    let registry = Arc::new(StaticServiceRegistry::new().with_service(
        SERVICE,
        vec![ServiceInstance::up("org-1", organisation_uri)],
    ));
    let resolver = OrganisationResolver::new(
        memory_store(),
        OrganisationClients::from_config(registry, &config).unwrap(),
        Arc::new(ResiliencePipeline::from_policy(
            "organisation-service",
            &bare_policy(),
        )),
    );

    LicenseServiceImpl::new(
        repository,
        Arc::new(resolver),
        Arc::new(StaticMessageSource::with_defaults("en")),
        "I AM THE DEFAULT",
        Arc::new(ResiliencePipeline::from_policy("license-service", license_policy)),
    )
}

#[tokio::test]
async fn test_enriched_license_then_cache_hit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organisation/O1"))
        .and(header("tmx-correlation-id", "corr-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "O1",
            "name": "Acme",
            "contactEmail": "x@acme.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service(&server.uri(), &bare_policy());

    let first = UserContext::new("corr-1")
        .scope(service.get_license_enriched("L1", "O1", "rest", None))
        .await
        .unwrap();
    assert_eq!(first.organisation_name.as_deref(), Some("Acme"));
    assert_eq!(first.contact_email.as_deref(), Some("x@acme.com"));
    assert_eq!(first.comment.as_deref(), Some("I AM THE DEFAULT"));

    let second = service
        .get_license_enriched("L1", "O1", "rest", None)
        .await
        .unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_unreachable_organisation_service_still_returns_license() {
    let service = service("http://127.0.0.1:1", &bare_policy());

    let license = service
        .get_license_enriched("L1", "O1", "discovery", None)
        .await
        .unwrap();

    assert_eq!(license.license_id, "L1");
    assert!(license.organisation_name.is_none());
}

#[tokio::test]
async fn test_sixth_listing_within_quota_window_is_placeholder() {
    let mut policy = bare_policy();
    policy.rate_limiter.enabled = true;
    policy.rate_limiter.limit_for_period = 5;
    policy.rate_limiter.limit_refresh_period_ms = 1_000;

    let service = service("http://127.0.0.1:1", &policy);

    for _ in 0..5 {
        let outcome = service.list_licenses("O1").await;
        assert!(outcome.is_success());
        assert_eq!(outcome.value().unwrap()[0].license_id, "L1");
    }

    let sixth = service.list_licenses("O1").await;
    assert!(sixth.is_degraded());
    let licenses = sixth.into_result().unwrap();
    assert_eq!(licenses.len(), 1);
    assert_eq!(licenses[0].license_id, FALLBACK_LICENSE_ID);
}

#[tokio::test]
async fn test_create_then_get_preserves_fields() {
    let service = service("http://127.0.0.1:1", &bare_policy());
    let request = CreateLicenseRequest::new("Ostock", "trial", Some("Evaluation".to_string()));

    let created = service.create_license("O2", request, None).await.unwrap();
    let fetched = service
        .get_license(&created.license.license_id, "O2", None)
        .await
        .unwrap();

    assert_ne!(fetched.license_id, FALLBACK_LICENSE_ID);
    assert_eq!(fetched.organisation_id, "O2");
    assert_eq!(fetched.product_name, "Ostock");
    assert_eq!(fetched.license_type, "trial");
    assert_eq!(fetched.description.as_deref(), Some("Evaluation"));
    assert_eq!(fetched.comment.as_deref(), Some("I AM THE DEFAULT"));
}

#[tokio::test(start_paused = true)]
async fn test_spaced_listings_cannot_exceed_quota_window() {
    let mut policy = bare_policy();
    policy.rate_limiter.enabled = true;
    policy.rate_limiter.limit_for_period = 5;
    policy.rate_limiter.limit_refresh_period_ms = 1_000;

    let service = service("http://127.0.0.1:1", &policy);

    for _ in 0..5 {
        assert!(service.list_licenses("O1").await.is_success());
    }

    let mut admitted = 5;
    for _ in 0..5 {
        tokio::time::advance(Duration::from_millis(190)).await;
        let outcome = service.list_licenses("O1").await;
        if outcome.is_success() {
            admitted += 1;
        } else {
            assert_eq!(outcome.value().unwrap()[0].license_id, FALLBACK_LICENSE_ID);
        }
    }
    assert_eq!(admitted, 5);

    tokio::time::advance(Duration::from_millis(50)).await;
    assert!(service.list_licenses("O1").await.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_listing_degrades_after_retryable_repository_errors() {
    let mut policy = bare_policy();
    policy.retry.max_attempts = 3;

    let repository = Arc::new(UnavailableListing::new(
        InMemoryLicenseRepository::with_licenses([l1()]),
    ));
    let service = service_over(repository.clone(), "http://127.0.0.1:1", &policy);

    let outcome = service.list_licenses("O1").await;

    assert!(matches!(outcome.cause(), Some(OptimaError::Database(_))));
    let licenses = outcome.into_result().unwrap();
    assert_eq!(licenses.len(), 1);
    assert_eq!(licenses[0].license_id, FALLBACK_LICENSE_ID);
    assert_eq!(licenses[0].organisation_id, "O1");
    assert_eq!(repository.listings(), 3);

    let license = service.get_license("L1", "O1", None).await.unwrap();
    assert_eq!(license.product_name, "Ostock");
}

#[tokio::test(start_paused = true)]
async fn test_configured_fault_injection_degrades_every_nth_listing() {
    let faults = FaultInjector::from_config(&FaultInjectionConfig {
        enabled: true,
        every_nth_call: 3,
        delay_ms: 5_000,
    });
    let service =
        service("http://127.0.0.1:1", &bare_policy()).with_fault_injector(Arc::new(faults));

    let outcomes = [
        service.list_licenses("O1").await,
        service.list_licenses("O1").await,
        service.list_licenses("O1").await,
        service.list_licenses("O1").await,
    ];

    assert!(outcomes[0].is_success());
    assert!(outcomes[1].is_success());
    assert!(matches!(outcomes[2].cause(), Some(OptimaError::Timeout(_))));
    assert_eq!(outcomes[2].value().unwrap()[0].license_id, FALLBACK_LICENSE_ID);
    assert!(outcomes[3].is_success());
}
