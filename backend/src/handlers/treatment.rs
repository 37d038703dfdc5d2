//! Treatment HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::CallerIdentity;
use crate::services::treatment::{CreateTreatmentInput, TreatmentService, UpdateTreatmentInput};
use crate::AppState;

/// List all treatments with their lot labels
pub async fn list_treatments(State(state): State<AppState>) -> impl IntoResponse {
    let service = TreatmentService::new(state.store.clone(), state.hub.clone());
    Json(service.list().await)
}

/// Record a treatment against an existing lot
pub async fn create_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(input): Json<CreateTreatmentInput>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.store.clone(), state.hub.clone());

    match service.create(&caller.0, input).await {
        Ok(treatment) => (StatusCode::CREATED, Json(treatment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a treatment
pub async fn update_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(treatment_id): Path<Uuid>,
    Json(input): Json<UpdateTreatmentInput>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.store.clone(), state.hub.clone());

    match service.update(&caller.0, treatment_id, input).await {
        Ok(treatment) => (StatusCode::OK, Json(treatment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a treatment when movements stay covered
pub async fn delete_treatment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(treatment_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.store.clone(), state.hub.clone());

    match service.delete(&caller.0, treatment_id).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => e.into_response(),
    }
}
