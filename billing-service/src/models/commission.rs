//! Sales commission model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Commission status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Earned,
    Paid,
}

impl CommissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "PENDING",
            CommissionStatus::Earned => "EARNED",
            CommissionStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(CommissionStatus::Pending),
            "EARNED" => Some(CommissionStatus::Earned),
            "PAID" => Some(CommissionStatus::Paid),
            _ => None,
        }
    }
}

/// A sales person's earned share of amounts actually received on an
/// invoice. Keyed uniquely by (invoice, sales person) and recomputed
/// from the cumulative amount received on every payment.
///
/// `paid_amount` and `paid_at` record a payout and are never touched by
/// recomputation, so marking a commission paid is never silently erased.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Commission {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub sales_person_id: Uuid,
    pub lead_id: Option<Uuid>,
    pub commission_percent: Decimal,
    pub base_amount: Decimal,
    pub commission_amount: Decimal,
    pub status: String,
    pub paid_amount: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter parameters for listing commissions.
#[derive(Debug, Clone, Default)]
pub struct ListCommissionsFilter {
    pub status: Option<CommissionStatus>,
    pub sales_person_id: Option<Uuid>,
}

/// Input for marking a commission paid out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkCommissionPaid {
    pub paid_at: Option<DateTime<Utc>>,
}

/// One commission row joined with its sales person, as fetched for the
/// summary aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRow {
    pub sales_person_id: Uuid,
    pub sales_person_name: String,
    pub commission_amount: Decimal,
    pub status: String,
}

/// Per-sales-person commission totals.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommissionSummary {
    pub sales_person_id: Uuid,
    pub sales_person_name: String,
    pub total_earned: Decimal,
    pub total_paid: Decimal,
    pub total_pending: Decimal,
}
