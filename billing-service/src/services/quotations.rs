//! Quotation lifecycle operations.

use service_core::AppError;
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    CreateQuotation, LineInput, Quotation, QuotationItem, QuotationStatus, QuotationWithItems,
    UpdateQuotation,
};
use crate::pricing::{self, ResolvedLine, TaxPolicy};

use super::database::Database;
use super::metrics::{DB_QUERY_DURATION, DOCUMENTS_TOTAL};
use super::numbering::{next_document_number, QUOTATION_PREFIX};

const QUOTATION_COLUMNS: &str = "id, quotation_number, client_id, lead_id, created_by_id, \
     issue_date, valid_until, status, currency, gst_enabled, tax_percent, subtotal, tax_amount, \
     total, notes, created_at, updated_at";

const QUOTATION_ITEM_COLUMNS: &str =
    "id, quotation_id, service_id, description, quantity, unit_price, line_total, sort_order";

impl Database {
    /// Resolve requested lines against the catalog and compute totals.
    ///
    /// `tax_percent` must be the caller-supplied value only. A document
    /// being repriced passes its stored percent as `stored_percent`;
    /// it ranks below the GST flag, so toggling GST off zeroes tax.
    async fn price_quotation_lines(
        &self,
        lines: &[LineInput],
        gst_enabled: bool,
        tax_percent: Option<rust_decimal::Decimal>,
        stored_percent: Option<rust_decimal::Decimal>,
    ) -> Result<(Vec<ResolvedLine>, pricing::DocumentTotals, String), AppError> {
        let settings = self.get_settings().await?;

        let service_ids: Vec<Uuid> = lines.iter().filter_map(|l| l.service_id).collect();
        let services = self.services_by_id(&service_ids).await?;

        let resolved = pricing::resolve_lines(lines, &services)?;
        let policy = match stored_percent {
            Some(stored) => TaxPolicy::for_existing(tax_percent, gst_enabled, stored),
            None => TaxPolicy {
                explicit_percent: tax_percent,
                gst_enabled,
                default_percent: Some(settings.tax_percent),
            },
        };
        let totals = pricing::calculate_totals(&resolved, &policy);

        Ok((resolved, totals, settings.currency))
    }

    /// Create a quotation in DRAFT with the next `DD-Q-<year>-NNNN`
    /// number.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_quotation(
        &self,
        input: &CreateQuotation,
    ) -> Result<QuotationWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_quotation"])
            .start_timer();

        let gst_enabled = input.gst_enabled.unwrap_or(true);
        let (resolved, totals, default_currency) = self
            .price_quotation_lines(&input.items, gst_enabled, input.tax_percent, None)
            .await?;
        let currency = input.currency.clone().unwrap_or(default_currency);

        let mut tx = self.pool().begin().await?;

        let number = next_document_number(&mut tx, "quotation", QUOTATION_PREFIX).await?;

        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            INSERT INTO quotations (
                id, quotation_number, client_id, lead_id, created_by_id, valid_until,
                status, currency, gst_enabled, tax_percent, subtotal, tax_amount, total, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {QUOTATION_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&number)
        .bind(input.client_id)
        .bind(input.lead_id)
        .bind(input.created_by_id)
        .bind(input.valid_until)
        .bind(QuotationStatus::Draft.as_str())
        .bind(&currency)
        .bind(gst_enabled)
        .bind(totals.tax_percent)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to create quotation: {}", e)))?;

        let items = insert_quotation_items(&mut tx, quotation.id, &resolved).await?;

        tx.commit().await?;
        timer.observe_duration();

        DOCUMENTS_TOTAL.with_label_values(&["quotation"]).inc();
        info!(
            quotation_id = %quotation.id,
            quotation_number = %quotation.quotation_number,
            total = %quotation.total,
            "Quotation created"
        );

        Ok(QuotationWithItems { quotation, items })
    }

    /// Get a quotation with its items.
    pub async fn get_quotation(&self, id: Uuid) -> Result<QuotationWithItems, AppError> {
        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get quotation: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quotation not found")))?;

        let items = self.get_quotation_items(id).await?;

        Ok(QuotationWithItems { quotation, items })
    }

    /// Ordered line items of a quotation.
    pub async fn get_quotation_items(
        &self,
        quotation_id: Uuid,
    ) -> Result<Vec<QuotationItem>, AppError> {
        sqlx::query_as::<_, QuotationItem>(&format!(
            "SELECT {QUOTATION_ITEM_COLUMNS} FROM quotation_items WHERE quotation_id = $1 \
             ORDER BY sort_order"
        ))
        .bind(quotation_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get quotation items: {}", e)))
    }

    /// List quotations, newest first, optionally filtered by status.
    pub async fn list_quotations(
        &self,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_quotations"])
            .start_timer();

        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            SELECT {QUOTATION_COLUMNS} FROM quotations
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list quotations: {}", e)))?;

        timer.observe_duration();

        Ok(quotations)
    }

    /// Update a quotation. A supplied `items` list replaces the whole
    /// set; otherwise totals are recomputed from the existing lines with
    /// the (possibly changed) tax parameters.
    #[instrument(skip(self, input), fields(quotation_id = %id))]
    pub async fn update_quotation(
        &self,
        id: Uuid,
        input: &UpdateQuotation,
    ) -> Result<QuotationWithItems, AppError> {
        let existing = self.get_quotation(id).await?;

        let lines: Vec<LineInput> = match &input.items {
            Some(items) => items.clone(),
            None => existing.items.iter().map(LineInput::from).collect(),
        };

        let gst_enabled = input.gst_enabled.unwrap_or(existing.quotation.gst_enabled);
        let (resolved, totals, _) = self
            .price_quotation_lines(
                &lines,
                gst_enabled,
                input.tax_percent,
                Some(existing.quotation.tax_percent),
            )
            .await?;

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE quotations
            SET valid_until = COALESCE($2, valid_until),
                status = COALESCE($3, status),
                currency = COALESCE($4, currency),
                gst_enabled = $5,
                tax_percent = $6,
                subtotal = $7,
                tax_amount = $8,
                total = $9,
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.valid_until)
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.currency)
        .bind(gst_enabled)
        .bind(totals.tax_percent)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to update quotation: {}", e)))?;

        if input.items.is_some() {
            sqlx::query("DELETE FROM quotation_items WHERE quotation_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Database(anyhow::anyhow!("Failed to replace quotation items: {}", e))
                })?;

            insert_quotation_items(&mut tx, id, &resolved).await?;
        }

        tx.commit().await?;

        info!(quotation_id = %id, "Quotation updated");

        self.get_quotation(id).await
    }

    /// Hard-delete a quotation; items cascade.
    #[instrument(skip(self), fields(quotation_id = %id))]
    pub async fn delete_quotation(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quotations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                AppError::Database(anyhow::anyhow!("Failed to delete quotation: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Quotation not found")));
        }

        info!(quotation_id = %id, "Quotation deleted");
        Ok(())
    }
}

async fn insert_quotation_items(
    tx: &mut Transaction<'_, Postgres>,
    quotation_id: Uuid,
    resolved: &[ResolvedLine],
) -> Result<Vec<QuotationItem>, AppError> {
    let mut items = Vec::with_capacity(resolved.len());

    for (index, line) in resolved.iter().enumerate() {
        let item = sqlx::query_as::<_, QuotationItem>(&format!(
            r#"
            INSERT INTO quotation_items (
                id, quotation_id, service_id, description, quantity, unit_price, line_total, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {QUOTATION_ITEM_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(quotation_id)
        .bind(line.service_id)
        .bind(&line.description)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.line_total)
        .bind(index as i32)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::Database(anyhow::anyhow!("Failed to insert quotation item: {}", e))
        })?;

        items.push(item);
    }

    Ok(items)
}
