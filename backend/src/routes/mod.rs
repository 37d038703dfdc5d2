//! Route definitions for the Seed Treatment Tracker

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::{handlers, live, middleware::identity_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Service status
        .route("/status", get(handlers::status))
        // Global unit settings
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        // Seed lots
        .route(
            "/seed-lots",
            get(handlers::list_lots).post(handlers::create_lot),
        )
        .route(
            "/seed-lots/:lot_id",
            put(handlers::update_lot).delete(handlers::delete_lot),
        )
        // Treatments
        .route(
            "/treatments",
            get(handlers::list_treatments).post(handlers::create_treatment),
        )
        .route(
            "/treatments/:treatment_id",
            put(handlers::update_treatment).delete(handlers::delete_treatment),
        )
        // Movements
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route(
            "/movements/:movement_id",
            put(handlers::update_movement).delete(handlers::delete_movement),
        )
        // Audit trail
        .route("/events", get(handlers::list_events))
        // Live updates
        .route("/live", get(live::ws_handler))
        .route_layer(middleware::from_fn(identity_middleware))
}
