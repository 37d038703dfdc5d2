//! Seed lot HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CallerIdentity;
use crate::services::lot::{CreateLotInput, LotService, UpdateLotInput};
use crate::AppState;

/// List all lots with their live balance figures
pub async fn list_lots(State(state): State<AppState>) -> impl IntoResponse {
    let service = LotService::new(state.store.clone(), state.hub.clone());
    Json(service.list().await)
}

/// Register a received lot
pub async fn create_lot(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(input): Json<CreateLotInput>,
) -> impl IntoResponse {
    let service = LotService::new(state.store.clone(), state.hub.clone());

    match service.create(&caller.0, input).await {
        Ok(lot) => (StatusCode::CREATED, Json(lot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a lot
pub async fn update_lot(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(lot_id): Path<Uuid>,
    Json(input): Json<UpdateLotInput>,
) -> impl IntoResponse {
    let service = LotService::new(state.store.clone(), state.hub.clone());

    match service.update(&caller.0, lot_id, input).await {
        Ok(lot) => (StatusCode::OK, Json(lot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a lot with no dependent treatments or movements
pub async fn delete_lot(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(lot_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = LotService::new(state.store.clone(), state.hub.clone());

    match service.delete(&caller.0, lot_id).await {
        Ok(removed) => (StatusCode::OK, Json(removed)).into_response(),
        Err(e) => e.into_response(),
    }
}
