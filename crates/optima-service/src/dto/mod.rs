//! Data Transfer Objects (DTOs).

mod license_dto;

pub use license_dto::*;
