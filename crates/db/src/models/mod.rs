//! Entity models and DTOs.

pub mod project;
pub mod user;
pub mod video;
