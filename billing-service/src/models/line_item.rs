//! Line item models for quotations and invoices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One billable row on a quotation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuotationItem {
    pub id: Uuid,
    pub quotation_id: Uuid,
    pub service_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub sort_order: i32,
}

/// One billable row on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub service_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub sort_order: i32,
}

/// A caller-supplied line request. Absent fields (as opposed to zero or
/// empty values) are resolved against the referenced catalog service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineInput {
    pub service_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

impl From<&QuotationItem> for LineInput {
    fn from(item: &QuotationItem) -> Self {
        LineInput {
            service_id: item.service_id,
            description: Some(item.description.clone()),
            quantity: Some(item.quantity),
            unit_price: Some(item.unit_price),
        }
    }
}

impl From<&InvoiceItem> for LineInput {
    fn from(item: &InvoiceItem) -> Self {
        LineInput {
            service_id: item.service_id,
            description: Some(item.description.clone()),
            quantity: Some(item.quantity),
            unit_price: Some(item.unit_price),
        }
    }
}
