//! Seed Treatment Tracker - Backend Server
//!
//! A small multi-user inventory tracker for agricultural seed lots:
//! records lot intake, partial chemical treatment, and outbound movements,
//! deriving live balances in kilograms, sacks, and bags. The balance
//! engine enforces, per lot, that shipped volume never exceeds treated
//! volume nor intake, regardless of the order records are created, edited,
//! or deleted in.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod live;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: store::Store,
    pub hub: live::UpdateHub,
    pub config: Arc<Config>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Seed Treatment Tracker API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
