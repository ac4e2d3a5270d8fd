use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use service_core::AppResult;
use uuid::Uuid;

use crate::models::{CreateService, Service, UpdateService};
use crate::state::AppState;

/// Add a service to the catalog.
pub async fn create_service(
    State(state): State<AppState>,
    Json(body): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    let service = state.db.create_service(&body).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// List all catalog services, newest first.
pub async fn list_services(State(state): State<AppState>) -> AppResult<Json<Vec<Service>>> {
    let services = state.db.list_services().await?;
    Ok(Json(services))
}

/// Get a single catalog service.
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Service>> {
    let service = state.db.get_service(id).await?;
    Ok(Json(service))
}

/// Update a catalog service. Existing line items keep their snapshots.
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateService>,
) -> AppResult<Json<Service>> {
    let service = state.db.update_service(id, &body).await?;
    Ok(Json(service))
}

/// Remove a service from the catalog.
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.db.delete_service(id).await?;
    Ok(Json(json!({ "message": "Service deleted successfully" })))
}
