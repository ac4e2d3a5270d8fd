//! Invoice lifecycle and payment application.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use service_core::AppError;
use sqlx::{Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    CreateInvoice, Invoice, InvoiceItem, InvoiceStatus, InvoiceWithItems, LineInput,
    PaymentStatus, RecordPayment, UpdateInvoice,
};
use crate::pricing::{self, ResolvedLine, TaxPolicy};

use super::database::Database;
use super::metrics::{
    COMMISSION_ACCRUALS_TOTAL, DB_QUERY_DURATION, DOCUMENTS_TOTAL, PAYMENT_AMOUNT_TOTAL,
};
use super::numbering::{next_document_number, INVOICE_PREFIX};

const INVOICE_COLUMNS: &str = "id, invoice_number, client_id, project_id, quotation_id, \
     created_by_id, issue_date, due_date, status, payment_status, currency, subtotal, \
     tax_percent, tax_amount, total, amount_received, balance, last_payment_date, notes, \
     created_at, updated_at";

const INVOICE_ITEM_COLUMNS: &str =
    "id, invoice_id, service_id, description, quantity, unit_price, line_total, sort_order";

impl Database {
    async fn price_invoice_lines(
        &self,
        lines: &[LineInput],
        tax_percent: Option<Decimal>,
        stored_percent: Option<Decimal>,
    ) -> Result<(Vec<ResolvedLine>, pricing::DocumentTotals, String), AppError> {
        let settings = self.get_settings().await?;

        let service_ids: Vec<Uuid> = lines.iter().filter_map(|l| l.service_id).collect();
        let services = self.services_by_id(&service_ids).await?;

        let resolved = pricing::resolve_lines(lines, &services)?;
        let policy = match stored_percent {
            Some(stored) => TaxPolicy::for_existing(tax_percent, true, stored),
            None => TaxPolicy {
                explicit_percent: tax_percent,
                gst_enabled: true,
                default_percent: Some(settings.tax_percent),
            },
        };
        let totals = pricing::calculate_totals(&resolved, &policy);

        Ok((resolved, totals, settings.currency))
    }

    /// Lines for an invoice derived from a quotation: a snapshot of the
    /// quotation's current items, not a live link.
    async fn lines_from_quotation(&self, quotation_id: Uuid) -> Result<Vec<LineInput>, AppError> {
        // Surfaces NotFound for a dangling quotation reference.
        let quotation = self.get_quotation(quotation_id).await?;

        if quotation.items.is_empty() {
            return Err(AppError::Validation(anyhow::anyhow!(
                "Quotation has no items"
            )));
        }

        Ok(quotation.items.iter().map(LineInput::from).collect())
    }

    /// Create an invoice with the next `DD-INV-<year>-NNNN` number.
    /// When `items` is omitted, lines are copied from the referenced
    /// quotation.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_invoice(&self, input: &CreateInvoice) -> Result<InvoiceWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let lines = match (&input.items, input.quotation_id) {
            (Some(items), _) if !items.is_empty() => items.clone(),
            (_, Some(quotation_id)) => self.lines_from_quotation(quotation_id).await?,
            _ => Vec::new(),
        };

        let (resolved, totals, default_currency) = self
            .price_invoice_lines(&lines, input.tax_percent, None)
            .await?;
        let currency = input.currency.clone().unwrap_or(default_currency);
        let status = input.status.unwrap_or(InvoiceStatus::Sent);

        let mut tx = self.pool().begin().await?;

        let number = next_document_number(&mut tx, "invoice", INVOICE_PREFIX).await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                id, invoice_number, client_id, project_id, quotation_id, created_by_id, due_date,
                status, payment_status, currency, subtotal, tax_percent, tax_amount, total,
                amount_received, balance, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 0, $14, $15)
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&number)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.quotation_id)
        .bind(input.created_by_id)
        .bind(input.due_date)
        .bind(status.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .bind(&currency)
        .bind(totals.subtotal)
        .bind(totals.tax_percent)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to create invoice: {}", e)))?;

        let items = insert_invoice_items(&mut tx, invoice.id, &resolved).await?;

        tx.commit().await?;
        timer.observe_duration();

        DOCUMENTS_TOTAL.with_label_values(&["invoice"]).inc();
        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "Invoice created"
        );

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Get an invoice with its items.
    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceWithItems, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get invoice: {}", e)))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {INVOICE_ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = $1 \
             ORDER BY sort_order"
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to get invoice items: {}", e)))?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// List invoices, newest first, optionally filtered by status.
    pub async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Update an invoice. Cancelled invoices are immutable. Balance is
    /// recomputed against the amount already received.
    #[instrument(skip(self, input), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: &UpdateInvoice,
    ) -> Result<InvoiceWithItems, AppError> {
        let existing = self.get_invoice(id).await?;

        if existing.invoice.status == InvoiceStatus::Cancelled.as_str() {
            return Err(AppError::InvalidState(anyhow::anyhow!(
                "Cancelled invoices cannot be modified"
            )));
        }

        let lines: Vec<LineInput> = match &input.items {
            Some(items) => items.clone(),
            None => existing.items.iter().map(LineInput::from).collect(),
        };

        let (resolved, totals, _) = self
            .price_invoice_lines(
                &lines,
                input.tax_percent,
                Some(existing.invoice.tax_percent),
            )
            .await?;

        let balance = pricing::round_money(totals.total - existing.invoice.amount_received);

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET due_date = COALESCE($2, due_date),
                status = COALESCE($3, status),
                currency = COALESCE($4, currency),
                tax_percent = $5,
                tax_amount = $6,
                subtotal = $7,
                total = $8,
                balance = $9,
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.due_date)
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.currency)
        .bind(totals.tax_percent)
        .bind(totals.tax_amount)
        .bind(totals.subtotal)
        .bind(totals.total)
        .bind(balance)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        if input.items.is_some() {
            sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Database(anyhow::anyhow!("Failed to replace invoice items: {}", e))
                })?;

            insert_invoice_items(&mut tx, id, &resolved).await?;
        }

        tx.commit().await?;

        info!(invoice_id = %id, "Invoice updated");

        self.get_invoice(id).await
    }

    /// Record a received payment against an invoice and re-accrue the
    /// responsible sales person's commission. Both writes share one
    /// transaction: they succeed or fail together.
    #[instrument(skip(self, input), fields(invoice_id = %id, amount = %input.amount))]
    pub async fn record_payment(
        &self,
        id: Uuid,
        input: &RecordPayment,
    ) -> Result<InvoiceWithItems, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_payment"])
            .start_timer();

        let existing = self.get_invoice(id).await?;
        let invoice = &existing.invoice;

        if invoice.status == InvoiceStatus::Cancelled.as_str() {
            return Err(AppError::InvalidState(anyhow::anyhow!(
                "Cannot record payment against a cancelled invoice"
            )));
        }

        let outcome =
            pricing::apply_payment(invoice.total, invoice.amount_received, input.amount)?;
        let payment_date = input.payment_date.unwrap_or_else(Utc::now);

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET amount_received = $2,
                balance = $3,
                status = $4,
                payment_status = $5,
                last_payment_date = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(outcome.amount_received)
        .bind(outcome.balance)
        .bind(outcome.status.as_str())
        .bind(outcome.payment_status.as_str())
        .bind(payment_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to record payment: {}", e)))?;

        accrue_commission(&mut tx, invoice, outcome.amount_received).await?;

        tx.commit().await?;
        timer.observe_duration();

        PAYMENT_AMOUNT_TOTAL
            .with_label_values(&[invoice.currency.as_str()])
            .inc_by(input.amount.to_f64().unwrap_or(0.0));
        info!(
            invoice_id = %id,
            amount_received = %outcome.amount_received,
            balance = %outcome.balance,
            status = outcome.status.as_str(),
            "Payment recorded"
        );

        self.get_invoice(id).await
    }

    /// Hard-delete an invoice; items and commissions cascade.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to delete invoice: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!("Invoice not found")));
        }

        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }
}

async fn insert_invoice_items(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: Uuid,
    resolved: &[ResolvedLine],
) -> Result<Vec<InvoiceItem>, AppError> {
    let mut items = Vec::with_capacity(resolved.len());

    for (index, line) in resolved.iter().enumerate() {
        let item = sqlx::query_as::<_, InvoiceItem>(&format!(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, service_id, description, quantity, unit_price, line_total, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVOICE_ITEM_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(invoice_id)
        .bind(line.service_id)
        .bind(&line.description)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.line_total)
        .bind(index as i32)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to insert invoice item: {}", e)))?;

        items.push(item);
    }

    Ok(items)
}

/// Re-accrue the commission for an invoice whose payment state changed.
///
/// The responsible sales person is the assignee of the quotation's
/// lead, falling back to the assignee of the client's originating lead;
/// with neither, the accrual is silently skipped. The rate is re-read
/// on every payment (a snapshot at accrual time), and the base amount
/// is the invoice's cumulative amount received, not the increment.
/// Recomputation never touches `paid_amount`/`paid_at`.
async fn accrue_commission(
    tx: &mut Transaction<'_, Postgres>,
    invoice: &Invoice,
    amount_received: Decimal,
) -> Result<(), AppError> {
    let mut sales_person_id: Option<Uuid> = None;
    let mut lead_id: Option<Uuid> = None;

    if let Some(quotation_id) = invoice.quotation_id {
        let row: Option<(Option<Uuid>, Uuid)> = sqlx::query_as(
            r#"
            SELECT l.assigned_to_id, l.id
            FROM quotations q
            JOIN leads l ON l.id = q.lead_id
            WHERE q.id = $1
            "#,
        )
        .bind(quotation_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to resolve lead: {}", e)))?;

        if let Some((assigned_to, lead)) = row {
            sales_person_id = assigned_to;
            lead_id = Some(lead);
        }
    }

    if sales_person_id.is_none() {
        let row: Option<(Option<Uuid>, Uuid)> = sqlx::query_as(
            r#"
            SELECT l.assigned_to_id, l.id
            FROM clients c
            JOIN leads l ON l.id = c.lead_id
            WHERE c.id = $1
            "#,
        )
        .bind(invoice.client_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to resolve lead: {}", e)))?;

        if let Some((assigned_to, lead)) = row {
            sales_person_id = assigned_to;
            if lead_id.is_none() {
                lead_id = Some(lead);
            }
        }
    }

    let Some(sales_person_id) = sales_person_id else {
        return Ok(());
    };

    let commission_percent: Decimal =
        sqlx::query_scalar("SELECT commission_percent FROM users WHERE id = $1")
            .bind(sales_person_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| {
                AppError::Database(anyhow::anyhow!("Failed to fetch commission rate: {}", e))
            })?
            .unwrap_or(Decimal::ZERO);

    let commission_amount = pricing::commission_amount(amount_received, commission_percent);
    let status = pricing::accrual_status(commission_amount);

    sqlx::query(
        r#"
        INSERT INTO commissions (
            id, invoice_id, sales_person_id, lead_id, commission_percent,
            base_amount, commission_amount, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (invoice_id, sales_person_id)
        DO UPDATE SET lead_id = EXCLUDED.lead_id,
                      commission_percent = EXCLUDED.commission_percent,
                      base_amount = EXCLUDED.base_amount,
                      commission_amount = EXCLUDED.commission_amount,
                      status = EXCLUDED.status,
                      updated_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(invoice.id)
    .bind(sales_person_id)
    .bind(lead_id)
    .bind(commission_percent)
    .bind(amount_received)
    .bind(commission_amount)
    .bind(status.as_str())
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::Database(anyhow::anyhow!("Failed to upsert commission: {}", e)))?;

    COMMISSION_ACCRUALS_TOTAL
        .with_label_values(&[status.as_str()])
        .inc();

    Ok(())
}
