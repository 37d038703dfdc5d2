//! Service status handler

use axum::{response::IntoResponse, Json};

/// Liveness probe with the running crate version
pub async fn status() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
