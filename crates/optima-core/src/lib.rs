//! # Optima Core
//!
//! Core types, domain entities, and error definitions for the Optima
//! licensing service. Every other crate in the workspace builds on these.

pub mod domain;
pub mod error;
pub mod messages;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use messages::*;
pub use result::*;
pub use validation::*;
