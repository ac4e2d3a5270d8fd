//! Agency settings model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton agency settings row. `tax_percent` and `currency` feed the
/// totals calculator and document defaults; the rest is identity data
/// reproduced on rendered documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settings {
    pub id: i16,
    pub brand_name: String,
    pub company_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub gst_number: Option<String>,
    pub tax_percent: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating agency settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettings {
    pub brand_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub gst_number: Option<String>,
    pub tax_percent: Option<Decimal>,
    pub currency: Option<String>,
}
