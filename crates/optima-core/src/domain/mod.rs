//! Domain entities for the licensing service.

mod license;
mod organisation;

pub use license::*;
pub use organisation::*;
