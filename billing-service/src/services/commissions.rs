//! Commission queries and payout.

use chrono::Utc;
use service_core::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    Commission, CommissionStatus, CommissionSummary, ListCommissionsFilter, MarkCommissionPaid,
    SummaryRow,
};
use crate::pricing;

use super::database::Database;
use super::metrics::DB_QUERY_DURATION;

const COMMISSION_COLUMNS: &str = "id, invoice_id, sales_person_id, lead_id, commission_percent, \
     base_amount, commission_amount, status, paid_amount, paid_at, created_at, updated_at";

impl Database {
    /// List commissions, newest first, optionally filtered by status
    /// and/or sales person.
    pub async fn list_commissions(
        &self,
        filter: &ListCommissionsFilter,
    ) -> Result<Vec<Commission>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_commissions"])
            .start_timer();

        let commissions = sqlx::query_as::<_, Commission>(&format!(
            r#"
            SELECT {COMMISSION_COLUMNS} FROM commissions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR sales_person_id = $2)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.sales_person_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list commissions: {}", e)))?;

        timer.observe_duration();

        Ok(commissions)
    }

    /// Per-sales-person earned/paid/pending totals across all
    /// commission records.
    pub async fn commission_summary(&self) -> Result<Vec<CommissionSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT c.sales_person_id, u.name AS sales_person_name,
                   c.commission_amount, c.status
            FROM commissions c
            JOIN users u ON u.id = c.sales_person_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            AppError::Database(anyhow::anyhow!("Failed to load commission summary: {}", e))
        })?;

        Ok(pricing::summarize(&rows))
    }

    /// Mark a commission as paid out, snapshotting the amount paid.
    #[instrument(skip(self, input), fields(commission_id = %id))]
    pub async fn mark_commission_paid(
        &self,
        id: Uuid,
        input: &MarkCommissionPaid,
    ) -> Result<Commission, AppError> {
        let paid_at = input.paid_at.unwrap_or_else(Utc::now);

        let commission = sqlx::query_as::<_, Commission>(&format!(
            r#"
            UPDATE commissions
            SET status = $2,
                paid_amount = commission_amount,
                paid_at = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMISSION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(CommissionStatus::Paid.as_str())
        .bind(paid_at)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            AppError::Database(anyhow::anyhow!("Failed to mark commission paid: {}", e))
        })?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Commission not found")))?;

        info!(
            commission_id = %id,
            paid_amount = %commission.commission_amount,
            "Commission marked paid"
        );

        Ok(commission)
    }
}
