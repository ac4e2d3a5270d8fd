//! Invoice model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::line_item::{InvoiceItem, LineInput};

/// Invoice status. Forward-only via payments; CANCELLED is terminal and
/// reachable only by an explicit caller-set transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Sent,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::PartiallyPaid => "PARTIALLY_PAID",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SENT" => Some(InvoiceStatus::Sent),
            "PARTIALLY_PAID" => Some(InvoiceStatus::PartiallyPaid),
            "PAID" => Some(InvoiceStatus::Paid),
            "OVERDUE" => Some(InvoiceStatus::Overdue),
            "CANCELLED" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

/// Payment status, derived from the cumulative amount received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        }
    }
}

/// A billing document, numbered `DD-INV-<year>-NNNN`.
///
/// Invariant: `round(amount_received + balance, 2) == total` and
/// `amount_received` never decreases.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub issue_date: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub status: String,
    pub payment_status: String,
    pub currency: String,
    pub subtotal: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub amount_received: Decimal,
    pub balance: Decimal,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An invoice together with its ordered line items.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Input for creating an invoice. When `items` is omitted and
/// `quotation_id` is given, lines are copied from that quotation as a
/// snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoice {
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub due_date: NaiveDate,
    pub items: Option<Vec<LineInput>>,
    pub currency: Option<String>,
    pub tax_percent: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

/// Input for updating an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoice {
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub currency: Option<String>,
    pub tax_percent: Option<Decimal>,
    pub notes: Option<String>,
    pub items: Option<Vec<LineInput>>,
}

/// Input for recording a received payment against an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPayment {
    pub amount: Decimal,
    pub payment_date: Option<DateTime<Utc>>,
}
