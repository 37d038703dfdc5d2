//! Movement HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CallerIdentity;
use crate::services::movement::{CreateMovementInput, MovementService, UpdateMovementInput};
use crate::AppState;

/// List all movements ordered by movement date
pub async fn list_movements(State(state): State<AppState>) -> impl IntoResponse {
    let service = MovementService::new(state.store.clone(), state.hub.clone());
    Json(service.list().await)
}

/// Record an outbound movement
pub async fn create_movement(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(input): Json<CreateMovementInput>,
) -> impl IntoResponse {
    let service = MovementService::new(state.store.clone(), state.hub.clone());

    match service.create(&caller.0, input).await {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a movement
pub async fn update_movement(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<UpdateMovementInput>,
) -> impl IntoResponse {
    let service = MovementService::new(state.store.clone(), state.hub.clone());

    match service.update(&caller.0, movement_id, input).await {
        Ok(movement) => (StatusCode::OK, Json(movement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a movement; always permitted for an existing record
pub async fn delete_movement(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(movement_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = MovementService::new(state.store.clone(), state.hub.clone());

    match service.delete(&caller.0, movement_id).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => e.into_response(),
    }
}
