//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Account CRUD
        .route("/accounts", get(handlers::list_accounts))
        .route("/accounts", post(handlers::create_accounts))
        .route("/accounts/{username}", delete(handlers::delete_account))
        // Posts and outliers
        .route("/outliers", get(handlers::get_outliers))
        .route("/posts/recent", get(handlers::get_recent_posts))
        .route("/stats", get(handlers::get_stats))
        // Analysis
        .route("/analyze", post(handlers::run_analysis));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
