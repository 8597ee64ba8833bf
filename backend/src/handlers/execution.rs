//! HTTP handlers for stock allocation and recipe execution

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::allocation::AllocationOutcome;
use crate::services::execution::{
    ExecuteFullInput, ExecuteProcessedInput, FullExecution, ProcessedExecution,
};
use crate::services::{AllocationService, ExecutionService};
use crate::AppState;

/// Input for a direct allocation
#[derive(Debug, Deserialize)]
pub struct AllocateInput {
    pub ingredient_id: i64,
    pub required_amount: Decimal,
}

/// Allocate stock for an ingredient
pub async fn allocate(
    State(state): State<AppState>,
    Json(input): Json<AllocateInput>,
) -> AppResult<Json<AllocationOutcome>> {
    let service = AllocationService::new(state.db);
    Ok(Json(
        service
            .allocate(input.ingredient_id, input.required_amount)
            .await?,
    ))
}

/// Execute a processed recipe, producing a stocked lot of its output
pub async fn execute_processed_recipe(
    State(state): State<AppState>,
    Json(input): Json<ExecuteProcessedInput>,
) -> AppResult<Json<ProcessedExecution>> {
    let service = ExecutionService::new(state.db);
    Ok(Json(service.execute_processed(input).await?))
}

/// Execute a full recipe, recording a sale
pub async fn execute_full_recipe(
    State(state): State<AppState>,
    Json(input): Json<ExecuteFullInput>,
) -> AppResult<Json<FullExecution>> {
    let service = ExecutionService::new(state.db);
    Ok(Json(service.execute_full(input).await?))
}
