//! HTTP handlers for sales audit endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::sale::SaleListQuery;
use crate::services::SaleService;
use crate::AppState;
use shared::Sale;

/// List sales (optionally `?recipe_id=` / `?restaurant_id=`)
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    Ok(Json(service.list_sales(query).await?))
}

/// Get a sale
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<i64>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    Ok(Json(service.get_sale(sale_id).await?))
}
