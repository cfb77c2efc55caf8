//! The set of lookup strategies available to the resolver.

use super::{ClientKind, HttpOrganisationClient, OrganisationClient, ServiceRegistry};
use optima_config::OrganisationServiceConfig;
use optima_core::OptimaResult;
use std::sync::Arc;
use tracing::debug;

/// One client per [`ClientKind`], selected by caller-supplied mode.
#[derive(Clone)]
pub struct OrganisationClients {
    discovery: Arc<dyn OrganisationClient>,
    load_balanced: Arc<dyn OrganisationClient>,
    declarative: Arc<dyn OrganisationClient>,
    default_kind: ClientKind,
}

impl OrganisationClients {
    /// Creates a set from explicit clients.
    pub fn new(
        discovery: Arc<dyn OrganisationClient>,
        load_balanced: Arc<dyn OrganisationClient>,
        declarative: Arc<dyn OrganisationClient>,
    ) -> Self {
        Self {
            discovery,
            load_balanced,
            declarative,
            default_kind: ClientKind::default(),
        }
    }

    /// Creates the three HTTP clients over `registry`.
    pub fn from_config(
        registry: Arc<dyn ServiceRegistry>,
        config: &OrganisationServiceConfig,
    ) -> OptimaResult<Self> {
        let clients = Self::new(
            Arc::new(HttpOrganisationClient::discovery(registry.clone(), config)?),
            Arc::new(HttpOrganisationClient::load_balanced(registry.clone(), config)?),
            Arc::new(HttpOrganisationClient::declarative(registry, config)?),
        );
        Ok(clients.with_default_kind(ClientKind::from_mode_or_default(&config.default_client)))
    }

    /// Sets the kind used when the caller supplies no mode.
    #[must_use]
    pub fn with_default_kind(mut self, kind: ClientKind) -> Self {
        self.default_kind = kind;
        self
    }

    /// Returns the kind used when the caller supplies no mode.
    pub fn default_kind(&self) -> ClientKind {
        self.default_kind
    }

    /// Returns the client for `kind`.
    pub fn get(&self, kind: ClientKind) -> &Arc<dyn OrganisationClient> {
        match kind {
            ClientKind::Discovery => &self.discovery,
            ClientKind::LoadBalanced => &self.load_balanced,
            ClientKind::Declarative => &self.declarative,
        }
    }

    /// Resolves a caller-supplied mode to a kind.
    ///
    /// A blank mode selects the default kind; an unrecognized one selects
    /// the load-balanced client.
    pub fn kind_for_mode(&self, mode: &str) -> ClientKind {
        let kind = if mode.trim().is_empty() {
            self.default_kind
        } else {
            ClientKind::from_mode_or_default(mode)
        };
        debug!("Selected the {} organisation client for mode '{}'", kind, mode);
        kind
    }
}

impl std::fmt::Debug for OrganisationClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganisationClients")
            .field("default_kind", &self.default_kind)
            .finish_non_exhaustive()
    }
}
