//! HTTP handlers for stock lot endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::stock::{CreateStockInput, StockListQuery, UpdateStockInput};
use crate::services::StockService;
use crate::AppState;
use shared::StockLot;

/// List stock lots (optionally `?ingredient_id=` / `?only_unexpired=true`)
pub async fn list_stock(
    State(state): State<AppState>,
    Query(query): Query<StockListQuery>,
) -> AppResult<Json<Vec<StockLot>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.list_stock(query).await?))
}

/// Get a stock lot
pub async fn get_stock(
    State(state): State<AppState>,
    Path(stock_id): Path<i64>,
) -> AppResult<Json<StockLot>> {
    let service = StockService::new(state.db);
    Ok(Json(service.get_stock(stock_id).await?))
}

/// Create a stock lot
pub async fn create_stock(
    State(state): State<AppState>,
    Json(input): Json<CreateStockInput>,
) -> AppResult<Json<StockLot>> {
    let service = StockService::new(state.db);
    Ok(Json(service.create_stock(input).await?))
}

/// Update a stock lot
pub async fn update_stock(
    State(state): State<AppState>,
    Path(stock_id): Path<i64>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<StockLot>> {
    let service = StockService::new(state.db);
    Ok(Json(service.update_stock(stock_id, input).await?))
}

/// Delete a stock lot
pub async fn delete_stock(
    State(state): State<AppState>,
    Path(stock_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = StockService::new(state.db);
    service.delete_stock(stock_id).await?;
    Ok(Json(()))
}
