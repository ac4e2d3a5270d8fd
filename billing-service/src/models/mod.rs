//! Domain models for billing-service.

mod commission;
mod invoice;
mod line_item;
mod quotation;
mod service;
mod settings;

pub use commission::{
    Commission, CommissionStatus, CommissionSummary, ListCommissionsFilter, MarkCommissionPaid,
    SummaryRow,
};
pub use invoice::{
    CreateInvoice, Invoice, InvoiceStatus, InvoiceWithItems, PaymentStatus, RecordPayment,
    UpdateInvoice,
};
pub use line_item::{InvoiceItem, LineInput, QuotationItem};
pub use quotation::{
    CreateQuotation, Quotation, QuotationStatus, QuotationWithItems, UpdateQuotation,
};
pub use service::{CreateService, Service, UpdateService};
pub use settings::{Settings, UpdateSettings};
