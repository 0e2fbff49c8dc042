//! API Module
//!
//! HTTP API layer for the server.

pub mod error;
pub mod health;
pub mod site;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Site endpoints
        .route("/api/site/deploy", post(site::deploy_site))
        .route("/api/site/build", post(site::build_site))
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
