//! Audit event HTTP handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::services::AuditService;
use crate::AppState;

/// Query parameters for the events listing
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

/// Most recent audit events first, capped
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let service = AuditService::new(state.store.clone());
    Json(service.recent(query.limit).await)
}
