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
    CreateQuotation, Quotation, QuotationStatus, QuotationWithItems, UpdateQuotation,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuotationsQuery {
    pub status: Option<String>,
}

/// Create a quotation. The quotation number is assigned atomically.
pub async fn create_quotation(
    State(state): State<AppState>,
    Json(body): Json<CreateQuotation>,
) -> AppResult<(StatusCode, Json<QuotationWithItems>)> {
    let quotation = state.db.create_quotation(&body).await?;
    Ok((StatusCode::CREATED, Json(quotation)))
}

/// List quotations, optionally filtered by status.
pub async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuotationsQuery>,
) -> AppResult<Json<Vec<Quotation>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            QuotationStatus::parse(s).ok_or_else(|| {
                AppError::Validation(anyhow::anyhow!("Invalid quotation status: {}", s))
            })
        })
        .transpose()?;

    let quotations = state.db.list_quotations(status).await?;
    Ok(Json(quotations))
}

/// Get a quotation with its items.
pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QuotationWithItems>> {
    let quotation = state.db.get_quotation(id).await?;
    Ok(Json(quotation))
}

/// Update a quotation, replacing items and repricing when provided.
pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateQuotation>,
) -> AppResult<Json<QuotationWithItems>> {
    let quotation = state.db.update_quotation(id, &body).await?;
    Ok(Json(quotation))
}

/// Delete a quotation and its items.
pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.db.delete_quotation(id).await?;
    Ok(Json(json!({ "message": "Quotation deleted successfully" })))
}
