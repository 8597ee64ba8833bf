//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::recipe::{CreateRecipeInput, RecipeWithDetails, UpdateRecipeInput};
use crate::services::RecipeService;
use crate::AppState;
use shared::Recipe;

/// List all recipes
pub async fn list_recipes(State(state): State<AppState>) -> AppResult<Json<Vec<Recipe>>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.list_recipes().await?))
}

/// Get a recipe with its ingredients and steps
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> AppResult<Json<RecipeWithDetails>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.get_recipe(recipe_id).await?))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<Json<RecipeWithDetails>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.create_recipe(input).await?))
}

/// Update a recipe (ingredient/step lists replace wholesale when present)
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<Json<RecipeWithDetails>> {
    let service = RecipeService::new(state.db);
    Ok(Json(service.update_recipe(recipe_id, input).await?))
}

/// Delete a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = RecipeService::new(state.db);
    service.delete_recipe(recipe_id).await?;
    Ok(Json(()))
}
