//! billing-service: quotations, invoices, payments and sales commissions
//! for the Digital Dhuriya business platform.

pub mod handlers;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod state;
