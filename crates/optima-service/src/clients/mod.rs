//! Remote organisation lookup strategies.
//!
//! Every strategy is an [`HttpOrganisationClient`]; they differ only in the
//! [`EndpointResolver`] that turns the logical service name into a base URL,
//! the request template, and whether request context is forwarded.
//!
//! | Kind | Endpoint choice | Forwards context |
//! |------|-----------------|------------------|
//! | discovery | first `Up` instance | no |
//! | load-balanced | round-robin over `Up` instances | yes |
//! | declarative | round-robin over `Up` instances | yes |

mod client_kind;
mod client_set;
mod endpoint;
mod http_client;
mod registry;

pub use client_kind::ClientKind;
pub use client_set::OrganisationClients;
pub use endpoint::{EndpointResolver, FirstUpResolver, RoundRobinResolver};
pub use http_client::{HttpOrganisationClient, OrganisationClient, RequestTemplate};
pub use registry::{InstanceStatus, ServiceInstance, ServiceRegistry, StaticServiceRegistry};

#[cfg(test)]
pub use http_client::MockOrganisationClient;
