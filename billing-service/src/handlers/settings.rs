use axum::{extract::State, Json};
use service_core::AppResult;

use crate::models::{Settings, UpdateSettings};
use crate::state::AppState;

/// Get organization settings, seeding defaults on first access.
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Settings>> {
    let settings = state.db.get_settings().await?;
    Ok(Json(settings))
}

/// Update organization settings.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<UpdateSettings>,
) -> AppResult<Json<Settings>> {
    let settings = state.db.update_settings(&body).await?;
    Ok(Json(settings))
}
