//! HTTP handlers for waste endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::waste::SweepOutcome;
use crate::services::WasteService;
use crate::AppState;
use shared::Waste;

/// List waste records
pub async fn list_waste(State(state): State<AppState>) -> AppResult<Json<Vec<Waste>>> {
    let service = WasteService::new(state.db);
    Ok(Json(service.list_waste().await?))
}

/// Get a waste record
pub async fn get_waste(
    State(state): State<AppState>,
    Path(waste_id): Path<i64>,
) -> AppResult<Json<Waste>> {
    let service = WasteService::new(state.db);
    Ok(Json(service.get_waste(waste_id).await?))
}

/// Sweep expired stock lots into waste records now
///
/// The background reaper does this on a timer; the endpoint exists for
/// manual runs.
pub async fn sweep_expired(State(state): State<AppState>) -> AppResult<Json<SweepOutcome>> {
    let service = WasteService::new(state.db);
    Ok(Json(service.sweep_expired(chrono::Utc::now()).await?))
}
