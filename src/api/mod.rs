//! HTTP API exposing the retrieval pipeline

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use handlers::RagHandle;
pub use server::build_app;
pub use server::serve_api;
