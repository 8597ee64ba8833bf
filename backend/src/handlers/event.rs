//! HTTP handlers for event endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::event::{CreateEventInput, UpdateEventInput};
use crate::services::EventService;
use crate::AppState;
use shared::Event;

/// List all events
pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let service = EventService::new(state.db);
    Ok(Json(service.list_events().await?))
}

/// Get an event
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.db);
    Ok(Json(service.get_event(event_id).await?))
}

/// Create an event
pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.db);
    Ok(Json(service.create_event(input).await?))
}

/// Update an event
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(input): Json<UpdateEventInput>,
) -> AppResult<Json<Event>> {
    let service = EventService::new(state.db);
    Ok(Json(service.update_event(event_id, input).await?))
}

/// Delete an event
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> AppResult<Json<()>> {
    let service = EventService::new(state.db);
    service.delete_event(event_id).await?;
    Ok(Json(()))
}
