//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers;
use super::handlers::AppState;

/// RESTful API router, mounted under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::get_stats))
        .route("/query", post(handlers::query))
        .route("/documents", post(handlers::add_document))
        .with_state(state)
}

/// Full application router without middleware
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes(state))
}
