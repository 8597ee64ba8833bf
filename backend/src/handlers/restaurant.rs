//! HTTP handlers for restaurant endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::restaurant::{CreateRestaurantInput, UpdateRestaurantInput};
use crate::services::RestaurantService;
use crate::AppState;
use shared::Restaurant;

/// List all restaurants
pub async fn list_restaurants(State(state): State<AppState>) -> AppResult<Json<Vec<Restaurant>>> {
    let service = RestaurantService::new(state.db);
    Ok(Json(service.list_restaurants().await?))
}

/// Get a restaurant
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let service = RestaurantService::new(state.db);
    Ok(Json(service.get_restaurant(restaurant_id).await?))
}

/// Create a restaurant
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(input): Json<CreateRestaurantInput>,
) -> AppResult<Json<Restaurant>> {
    let service = RestaurantService::new(state.db);
    Ok(Json(service.create_restaurant(input).await?))
}

/// Update a restaurant
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
    Json(input): Json<UpdateRestaurantInput>,
) -> AppResult<Json<Restaurant>> {
    let service = RestaurantService::new(state.db);
    Ok(Json(service.update_restaurant(restaurant_id, input).await?))
}

/// Delete a restaurant
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = RestaurantService::new(state.db);
    service.delete_restaurant(restaurant_id).await?;
    Ok(Json(()))
}
