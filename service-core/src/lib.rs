//! service-core: Shared infrastructure for Digital Dhuriya services.
pub mod config;
pub mod error;
pub mod observability;

pub use error::{AppError, AppResult};
