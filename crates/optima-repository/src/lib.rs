//! # Optima Repository
//!
//! License store used by the license service.
//!
//! ```text
//! LicenseService
//!   ↓  Arc<dyn LicenseRepository>
//! InMemoryLicenseRepository     (keyed by organisation id + license id)
//! ```

pub mod memory;
pub mod traits;

pub use memory::InMemoryLicenseRepository;
pub use traits::*;
