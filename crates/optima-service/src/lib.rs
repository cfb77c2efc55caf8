//! # Optima Service
//!
//! Business logic for Optima Licensing: the license service, the
//! cache-aside organisation resolver, the remote organisation clients,
//! and the caches they share.

pub mod cache;
pub mod clients;
pub mod context;
pub mod dto;
pub mod r#impl;
pub mod license_service;
pub mod metrics;
pub mod resolver;

pub use cache::*;
pub use clients::*;
pub use context::*;
pub use dto::*;
pub use license_service::*;
pub use r#impl::LicenseServiceImpl;
pub use resolver::*;
