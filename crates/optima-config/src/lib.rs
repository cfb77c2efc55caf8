//! # Optima Config
//!
//! Configuration management for Optima Licensing.
//! Configuration is loaded once from layered sources (files, `.env`,
//! environment variables), validated, and then shared read-only.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
