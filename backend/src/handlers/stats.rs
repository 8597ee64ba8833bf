//! HTTP handlers for dashboard statistics

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::stats::{StockCounts, StockHistory};
use crate::services::StatsService;
use crate::AppState;

/// Distinct stocked ingredient counts, raw vs processed
pub async fn get_stock_counts(State(state): State<AppState>) -> AppResult<Json<StockCounts>> {
    let service = StatsService::new(state.db);
    Ok(Json(service.stock_counts().await?))
}

/// Daily purchased amounts over the trailing week
pub async fn get_stock_history(State(state): State<AppState>) -> AppResult<Json<StockHistory>> {
    let service = StatsService::new(state.db);
    Ok(Json(service.stock_history().await?))
}
