//! HTTP handlers for ingredient endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppResult;
use crate::services::ingredient::{CreateIngredientInput, UpdateIngredientInput};
use crate::services::IngredientService;
use crate::AppState;
use shared::Ingredient;

/// List all ingredients
pub async fn list_ingredients(State(state): State<AppState>) -> AppResult<Json<Vec<Ingredient>>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.list_ingredients().await?))
}

/// Get an ingredient
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.get_ingredient(ingredient_id).await?))
}

/// Create an ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.create_ingredient(input).await?))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    Ok(Json(service.update_ingredient(ingredient_id, input).await?))
}

/// Delete an ingredient
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = IngredientService::new(state.db);
    service.delete_ingredient(ingredient_id).await?;
    Ok(Json(()))
}

#[derive(Serialize)]
pub struct TotalQuantityResponse {
    pub ingredient_id: i64,
    pub total_quantity: Decimal,
}

/// Total unexpired stocked quantity for an ingredient
pub async fn get_total_quantity(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> AppResult<Json<TotalQuantityResponse>> {
    let service = IngredientService::new(state.db);
    let total_quantity = service.total_quantity(ingredient_id).await?;
    Ok(Json(TotalQuantityResponse {
        ingredient_id,
        total_quantity,
    }))
}
