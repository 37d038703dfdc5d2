//! Unit settings HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use shared::models::UnitSettings;

use crate::middleware::CallerIdentity;
use crate::services::SettingsService;
use crate::AppState;

/// Read the current unit ratios
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let service = SettingsService::new(state.store.clone(), state.hub.clone());
    Json(service.get().await)
}

/// Replace the unit ratios wholesale
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(input): Json<UnitSettings>,
) -> impl IntoResponse {
    let service = SettingsService::new(state.store.clone(), state.hub.clone());

    match service.replace(&caller.0, input).await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => e.into_response(),
    }
}
