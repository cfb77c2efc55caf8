//! License service implementations.
//!
//! Trait definitions live in the parent module (e.g. `license_service.rs`).

pub mod license_service_impl;

pub use license_service_impl::LicenseServiceImpl;
