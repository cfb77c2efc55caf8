//! Service registry holding live instances by logical service name.

use async_trait::async_trait;
use optima_config::OrganisationServiceConfig;
use optima_core::OptimaResult;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

/// Health of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Accepting traffic.
    Up,
    /// Not accepting traffic.
    Down,
}

/// One registered instance of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    /// Instance identifier.
    pub instance_id: String,
    /// Base URI, e.g. `http://10.0.0.5:8081`.
    pub uri: String,
    /// Current status.
    pub status: InstanceStatus,
}

impl ServiceInstance {
    /// Creates an instance in the `Up` state.
    pub fn up(instance_id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            uri: uri.into(),
            status: InstanceStatus::Up,
        }
    }

    /// Returns true if the instance accepts traffic.
    pub fn is_up(&self) -> bool {
        self.status == InstanceStatus::Up
    }
}

/// Lookup of instances by logical service name.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Returns every registered instance of `service_name`, in registry order.
    async fn instances(&self, service_name: &str) -> OptimaResult<Vec<ServiceInstance>>;
}

/// Registry populated from configuration.
#[derive(Debug, Default)]
pub struct StaticServiceRegistry {
    services: RwLock<HashMap<String, Vec<ServiceInstance>>>,
}

impl StaticServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instances` under `service_name`, replacing any previous set.
    #[must_use]
    pub fn with_service(self, service_name: impl Into<String>, instances: Vec<ServiceInstance>) -> Self {
        self.services.write().insert(service_name.into(), instances);
        self
    }

    /// Builds a registry holding the configured organisation service instances.
    pub fn from_config(config: &OrganisationServiceConfig) -> Self {
        let instances = config
            .instances
            .iter()
            .map(|instance| ServiceInstance {
                instance_id: instance.id.clone(),
                uri: instance.url.clone(),
                status: if instance.up {
                    InstanceStatus::Up
                } else {
                    InstanceStatus::Down
                },
            })
            .collect::<Vec<_>>();

        info!(
            "Registered {} instance(s) of '{}'",
            instances.len(),
            config.service_name
        );
        Self::new().with_service(config.service_name.clone(), instances)
    }

    /// Updates the status of one instance. Returns false if it is unknown.
    pub fn set_status(&self, service_name: &str, instance_id: &str, status: InstanceStatus) -> bool {
        let mut services = self.services.write();
        match services
            .get_mut(service_name)
            .and_then(|instances| instances.iter_mut().find(|i| i.instance_id == instance_id))
        {
            Some(instance) => {
                instance.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ServiceRegistry for StaticServiceRegistry {
    async fn instances(&self, service_name: &str) -> OptimaResult<Vec<ServiceInstance>> {
        Ok(self
            .services
            .read()
            .get(service_name)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optima_config::ServiceInstanceConfig;

    #[tokio::test]
    async fn test_from_config_keeps_order_and_status() {
        let config = OrganisationServiceConfig {
            service_name: "org".to_string(),
            instances: vec![
                ServiceInstanceConfig {
                    id: "a".to_string(),
                    url: "http://a".to_string(),
                    up: false,
                },
                ServiceInstanceConfig {
                    id: "b".to_string(),
                    url: "http://b".to_string(),
                    up: true,
                },
            ],
            ..OrganisationServiceConfig::default()
        };

        let registry = StaticServiceRegistry::from_config(&config);
        let instances = registry.instances("org").await.unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].status, InstanceStatus::Down);
        assert!(instances[1].is_up());
    }

    #[tokio::test]
    async fn test_unknown_service_has_no_instances() {
        let registry = StaticServiceRegistry::new();
        assert!(registry.instances("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status() {
        let registry =
            StaticServiceRegistry::new().with_service("org", vec![ServiceInstance::up("a", "http://a")]);

        assert!(registry.set_status("org", "a", InstanceStatus::Down));
        assert!(!registry.set_status("org", "zz", InstanceStatus::Down));
        assert!(!registry.instances("org").await.unwrap()[0].is_up());
    }
}
