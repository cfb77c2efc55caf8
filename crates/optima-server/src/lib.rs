//! # Optima Server Library
//!
//! Component wiring and startup utilities for the Optima Licensing server.

pub mod di;
pub mod startup;
