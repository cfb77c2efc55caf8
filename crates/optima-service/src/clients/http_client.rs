//! HTTP organisation client.

use super::{ClientKind, EndpointResolver, FirstUpResolver, RoundRobinResolver, ServiceRegistry};
use crate::context::{UserContext, CORRELATION_ID_HEADER};
use crate::metrics::ServiceMetrics;
use async_trait::async_trait;
use optima_config::OrganisationServiceConfig;
use optima_core::{OptimaError, OptimaResult, Organisation};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const ORGANISATION_ID_PLACEHOLDER: &str = "{organisationId}";

/// Fetches organisation records from the remote organisation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganisationClient: Send + Sync {
    /// Returns the organisation, or `None` if the remote has no such record.
    async fn fetch(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>>;

    /// Returns which strategy this client implements.
    fn kind(&self) -> ClientKind;
}

/// Statically declared request shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    /// HTTP method.
    pub method: Method,
    /// Path with an `{organisationId}` placeholder.
    pub path_template: String,
    /// Content type sent with the request.
    pub content_type: Option<String>,
}

impl RequestTemplate {
    /// A plain GET of `path_template`.
    pub fn get(path_template: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path_template: path_template.into(),
            content_type: None,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Builds the request URL for one organisation on `base`.
    ///
    /// The template is split on `/`; the segment equal to
    /// `{organisationId}` is replaced by the identifier, percent-encoded as
    /// a single path segment.
    pub fn url(&self, base: &str, organisation_id: &str) -> OptimaResult<Url> {
        if matches!(organisation_id.trim(), "" | "." | "..") {
            return Err(OptimaError::validation(format!(
                "Invalid organisation id '{}'",
                organisation_id
            )));
        }

        let mut url = Url::parse(base).map_err(|e| {
            OptimaError::Configuration(format!("Invalid organisation URL '{}': {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                OptimaError::Configuration(format!(
                    "Organisation URL '{}' cannot carry a path",
                    base
                ))
            })?
            .pop_if_empty()
            .extend(
                self.path_template
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(|segment| {
                        if segment == ORGANISATION_ID_PLACEHOLDER {
                            organisation_id
                        } else {
                            segment
                        }
                    }),
            );
        Ok(url)
    }
}

/// [`OrganisationClient`] over HTTP/JSON.
pub struct HttpOrganisationClient {
    kind: ClientKind,
    client: Client,
    service_name: String,
    resolver: Arc<dyn EndpointResolver>,
    template: RequestTemplate,
    propagate_context: bool,
}

impl HttpOrganisationClient {
    /// Registry-resolved client: first live instance, no context forwarding.
    pub fn discovery(
        registry: Arc<dyn ServiceRegistry>,
        config: &OrganisationServiceConfig,
    ) -> OptimaResult<Self> {
        Self::build(
            ClientKind::Discovery,
            Arc::new(FirstUpResolver::new(registry)),
            RequestTemplate::get(&config.path_template),
            false,
            config,
        )
    }

    /// Load-balanced client: round-robin across live instances.
    pub fn load_balanced(
        registry: Arc<dyn ServiceRegistry>,
        config: &OrganisationServiceConfig,
    ) -> OptimaResult<Self> {
        Self::build(
            ClientKind::LoadBalanced,
            Arc::new(RoundRobinResolver::new(registry)),
            RequestTemplate::get(&config.path_template),
            true,
            config,
        )
    }

    /// Declarative client: a JSON request template resolved like the load-balanced client.
    pub fn declarative(
        registry: Arc<dyn ServiceRegistry>,
        config: &OrganisationServiceConfig,
    ) -> OptimaResult<Self> {
        Self::build(
            ClientKind::Declarative,
            Arc::new(RoundRobinResolver::new(registry)),
            RequestTemplate::get(&config.path_template).with_content_type("application/json"),
            true,
            config,
        )
    }

    fn build(
        kind: ClientKind,
        resolver: Arc<dyn EndpointResolver>,
        template: RequestTemplate,
        propagate_context: bool,
        config: &OrganisationServiceConfig,
    ) -> OptimaResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| OptimaError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            kind,
            client,
            service_name: config.service_name.clone(),
            resolver,
            template,
            propagate_context,
        })
    }

    async fn request(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>> {
        let Some(base) = self.resolver.resolve(&self.service_name).await? else {
            debug!(
                "No live instance of '{}' for the {} client",
                self.service_name, self.kind
            );
            return Ok(None);
        };

        let url = self.template.url(&base, organisation_id)?;
        debug!("{} client GET {}", self.kind, url);

        let mut request = self.client.request(self.template.method.clone(), url);
        if let Some(content_type) = &self.template.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if self.propagate_context {
            if let Some(ctx) = UserContext::current() {
                request = request.header(CORRELATION_ID_HEADER, ctx.correlation_id.as_str());
                if let Some(token) = &ctx.auth_token {
                    request = request.bearer_auth(token);
                }
            }
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(organisation_id, response).await
    }

    async fn handle_response(
        &self,
        organisation_id: &str,
        response: Response,
    ) -> OptimaResult<Option<Organisation>> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_http_error(status, &body));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let organisation = serde_json::from_str::<Option<Organisation>>(&body).map_err(|e| {
            OptimaError::remote_rejected(
                &self.service_name,
                format!("Invalid organisation payload: {}", e),
            )
        })?;

        match organisation {
            Some(org) if org.id != organisation_id => {
                warn!(
                    "{} client asked for organisation '{}' but received '{}'; treating as not found",
                    self.kind, organisation_id, org.id
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn map_http_error(&self, status: StatusCode, body: &str) -> OptimaError {
        let message = format!("HTTP error {}: {}", status, body);
        if status.is_server_error() {
            OptimaError::remote_unavailable(&self.service_name, message)
        } else {
            OptimaError::remote_rejected(&self.service_name, message)
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> OptimaError {
        if error.is_timeout() {
            OptimaError::Timeout(format!("Request to '{}' timed out", self.service_name))
        } else {
            OptimaError::remote_unavailable(&self.service_name, format!("HTTP error: {}", error))
        }
    }
}

#[async_trait]
impl OrganisationClient for HttpOrganisationClient {
    async fn fetch(&self, organisation_id: &str) -> OptimaResult<Option<Organisation>> {
        let result = self.request(organisation_id).await;

        let outcome = match &result {
            Ok(Some(_)) => "found",
            Ok(None) => "not_found",
            Err(_) => "error",
        };
        ServiceMetrics::remote_fetch(self.kind.as_str(), outcome);

        result
    }

    fn kind(&self) -> ClientKind {
        self.kind
    }
}

impl std::fmt::Debug for HttpOrganisationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOrganisationClient")
            .field("kind", &self.kind)
            .field("service_name", &self.service_name)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
