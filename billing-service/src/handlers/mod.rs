pub mod catalog;
pub mod commissions;
pub mod general;
pub mod invoices;
pub mod quotations;
pub mod settings;
