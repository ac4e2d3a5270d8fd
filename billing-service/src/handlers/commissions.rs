use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use service_core::{AppError, AppResult};
use uuid::Uuid;

use crate::models::{
    Commission, CommissionStatus, CommissionSummary, ListCommissionsFilter, MarkCommissionPaid,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCommissionsQuery {
    pub status: Option<String>,
    pub sales_person_id: Option<Uuid>,
}

/// List commission records, optionally filtered by status and sales
/// person.
pub async fn list_commissions(
    State(state): State<AppState>,
    Query(query): Query<ListCommissionsQuery>,
) -> AppResult<Json<Vec<Commission>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            CommissionStatus::parse(s).ok_or_else(|| {
                AppError::Validation(anyhow::anyhow!("Invalid commission status: {}", s))
            })
        })
        .transpose()?;

    let commissions = state
        .db
        .list_commissions(&ListCommissionsFilter {
            status,
            sales_person_id: query.sales_person_id,
        })
        .await?;

    Ok(Json(commissions))
}

/// Per-sales-person earned/paid/pending totals.
pub async fn commission_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CommissionSummary>>> {
    let summary = state.db.commission_summary().await?;
    Ok(Json(summary))
}

/// Mark a commission as paid out.
pub async fn mark_commission_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MarkCommissionPaid>,
) -> AppResult<Json<Commission>> {
    let commission = state.db.mark_commission_paid(id, &body).await?;
    Ok(Json(commission))
}
