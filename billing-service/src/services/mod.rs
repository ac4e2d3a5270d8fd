//! Services module for billing-service.

mod catalog;
mod commissions;
pub mod database;
mod invoices;
pub mod metrics;
mod numbering;
mod quotations;
mod settings;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
