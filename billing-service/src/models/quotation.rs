//! Quotation model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::line_item::{LineInput, QuotationItem};

/// Quotation status. Transitions are caller-directed; there is no
/// automatic expiry enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Sent => "SENT",
            QuotationStatus::Accepted => "ACCEPTED",
            QuotationStatus::Rejected => "REJECTED",
            QuotationStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(QuotationStatus::Draft),
            "SENT" => Some(QuotationStatus::Sent),
            "ACCEPTED" => Some(QuotationStatus::Accepted),
            "REJECTED" => Some(QuotationStatus::Rejected),
            "EXPIRED" => Some(QuotationStatus::Expired),
            _ => None,
        }
    }
}

/// A priced proposal, numbered `DD-Q-<year>-NNNN`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quotation {
    pub id: Uuid,
    pub quotation_number: String,
    pub client_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub issue_date: DateTime<Utc>,
    pub valid_until: NaiveDate,
    pub status: String,
    pub currency: String,
    pub gst_enabled: bool,
    pub tax_percent: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quotation together with its ordered line items.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationWithItems {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub items: Vec<QuotationItem>,
}

/// Input for creating a quotation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuotation {
    pub client_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub valid_until: NaiveDate,
    pub items: Vec<LineInput>,
    pub currency: Option<String>,
    pub gst_enabled: Option<bool>,
    pub tax_percent: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for updating a quotation. A supplied `items` list replaces the
/// entire line-item set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuotation {
    pub valid_until: Option<NaiveDate>,
    pub status: Option<QuotationStatus>,
    pub currency: Option<String>,
    pub gst_enabled: Option<bool>,
    pub tax_percent: Option<Decimal>,
    pub notes: Option<String>,
    pub items: Option<Vec<LineInput>>,
}
