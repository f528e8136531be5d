//! HTTP server implementation

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::handlers::RagHandle;
use crate::api::routes;
use crate::config::AppConfig;
use crate::config::ServerConfig;
use crate::Result;

/// Router with tracing, compression, body limit and optional CORS layers
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let mut app = routes::app_routes(state)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if server.enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Initialize the pipeline and serve the API until Ctrl-C
pub async fn serve_api(config: AppConfig) -> Result<()> {
    info!("Starting Healthcare RAG API server...");

    let addr = config.bind_address();
    let server = config.server.clone();
    let state = AppState::new(RagHandle::startup(config).await);
    let app = build_app(state, &server);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /                - API information");
    info!("  GET  /api/health      - Health check");
    info!("  GET  /api/stats       - Knowledge base statistics");
    info!("  POST /api/query       - Ask a question");
    info!("  POST /api/documents   - Add a document");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
