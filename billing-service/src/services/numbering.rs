//! Sequential document numbering.
//!
//! Numbers follow `PREFIX<year>-NNNN` with the sequence scoped per
//! calendar year. The sequence is backed by an atomic per-(kind, year)
//! counter row incremented inside the creating transaction, so
//! concurrent creates can never be assigned the same number.

use chrono::{Datelike, Utc};
use service_core::AppError;
use sqlx::{Postgres, Transaction};

pub const QUOTATION_PREFIX: &str = "DD-Q-";
pub const INVOICE_PREFIX: &str = "DD-INV-";

/// Allocate the next document number for the current calendar year.
pub async fn next_document_number(
    tx: &mut Transaction<'_, Postgres>,
    kind: &str,
    prefix: &str,
) -> Result<String, AppError> {
    let year = Utc::now().year();

    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO document_counters (kind, year, value)
        VALUES ($1, $2, 1)
        ON CONFLICT (kind, year)
        DO UPDATE SET value = document_counters.value + 1
        RETURNING value
        "#,
    )
    .bind(kind)
    .bind(year)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        AppError::Database(anyhow::anyhow!("Failed to allocate document number: {}", e))
    })?;

    Ok(format!("{prefix}{year}-{sequence:04}"))
}
