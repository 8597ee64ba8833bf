//! HTTP handlers for user endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::user::{CreateUserInput, UpdateUserInput};
use crate::services::UserService;
use crate::AppState;
use shared::User;

/// List all users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let service = UserService::new(state.db);
    Ok(Json(service.list_users().await?))
}

/// Get a user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    Ok(Json(service.get_user(user_id).await?))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    Ok(Json(service.create_user(input).await?))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    let service = UserService::new(state.db);
    Ok(Json(service.update_user(user_id, input).await?))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = UserService::new(state.db);
    service.delete_user(user_id).await?;
    Ok(Json(()))
}
