use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use service_core::{AppError, AppResult};
use uuid::Uuid;

use crate::models::{
    CreateInvoice, Invoice, InvoiceStatus, InvoiceWithItems, RecordPayment, UpdateInvoice,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
}

/// Create an invoice, either from explicit items or from a quotation.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(body): Json<CreateInvoice>,
) -> AppResult<(StatusCode, Json<InvoiceWithItems>)> {
    let invoice = state.db.create_invoice(&body).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// List invoices, optionally filtered by status.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            InvoiceStatus::parse(s).ok_or_else(|| {
                AppError::Validation(anyhow::anyhow!("Invalid invoice status: {}", s))
            })
        })
        .transpose()?;

    let invoices = state.db.list_invoices(status).await?;
    Ok(Json(invoices))
}

/// Get an invoice with its items.
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InvoiceWithItems>> {
    let invoice = state.db.get_invoice(id).await?;
    Ok(Json(invoice))
}

/// Update an invoice. Cancelled invoices are rejected.
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInvoice>,
) -> AppResult<Json<InvoiceWithItems>> {
    let invoice = state.db.update_invoice(id, &body).await?;
    Ok(Json(invoice))
}

/// Record a payment against an invoice. Commission accrual happens in
/// the same transaction.
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RecordPayment>,
) -> AppResult<Json<InvoiceWithItems>> {
    let invoice = state.db.record_payment(id, &body).await?;
    Ok(Json(invoice))
}

/// Delete an invoice; items and commissions are removed with it.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.db.delete_invoice(id).await?;
    Ok(Json(json!({ "message": "Invoice deleted successfully" })))
}
