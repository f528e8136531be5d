//! API request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tokio::sync::OnceCell;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::api::types::*;
use crate::config::AppConfig;
use crate::errors::HealthRagError;
use crate::errors::Result;
use crate::models::metadata_from_json;
use crate::models::validate_content;
use crate::models::validate_max_results;
use crate::models::validate_question;
use crate::models::Query;
use crate::models::RagStats;
use crate::rag::HealthcareRag;

/// The pipeline, or the configuration to build it from on first use
pub struct RagHandle {
    cell: OnceCell<Arc<HealthcareRag>>,
    config: Option<AppConfig>,
    /// Upper bound on `max_results`, known before the pipeline exists
    max_results_limit: usize,
}

impl RagHandle {
    /// Handle around an initialized pipeline
    pub fn ready(rag: Arc<HealthcareRag>) -> Self {
        Self {
            max_results_limit: rag.max_results_limit(),
            cell: OnceCell::new_with(Some(rag)),
            config: None,
        }
    }

    /// Handle that initializes the pipeline on the first request needing it
    pub fn lazy(config: AppConfig) -> Self {
        Self {
            cell: OnceCell::new(),
            max_results_limit: config.retrieval.max_results_limit,
            config: Some(config),
        }
    }

    /// Try eager initialization; failures are logged and retried later
    pub async fn startup(config: AppConfig) -> Self {
        match HealthcareRag::from_config(&config).await {
            Ok(rag) => {
                info!("Healthcare RAG system initialized successfully");
                Self::ready(Arc::new(rag))
            }
            Err(e) => {
                warn!("Could not initialize RAG system: {}", e);
                warn!("RAG system will be initialized on first request");
                Self::lazy(config)
            }
        }
    }

    /// The pipeline, initializing it at most once across concurrent callers
    pub async fn get(&self) -> Result<Arc<HealthcareRag>> {
        if let Some(rag) = self.cell.get() {
            return Ok(rag.clone());
        }
        let config = self.config.as_ref().ok_or_else(|| {
            HealthRagError::ConfigError("RAG system has no configuration".to_string())
        })?;
        self.cell
            .get_or_try_init(|| async { HealthcareRag::from_config(config).await.map(Arc::new) })
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagHandle>,
}

impl AppState {
    pub fn new(rag: RagHandle) -> Self {
        Self { rag: Arc::new(rag) }
    }

    async fn rag(&self) -> std::result::Result<Arc<HealthcareRag>, ApiError> {
        self.rag.get().await.map_err(|e| {
            error!("Failed to initialize RAG system: {}", e);
            ApiError::internal(INIT_FAILED_DETAIL)
        })
    }
}

/// API information
pub async fn root() -> Json<ApiInfoResponse> {
    let endpoints = BTreeMap::from([
        ("query".to_string(), "/api/query".to_string()),
        ("add_document".to_string(), "/api/documents".to_string()),
        ("stats".to_string(), "/api/stats".to_string()),
        ("health".to_string(), "/api/health".to_string()),
    ]);
    Json(ApiInfoResponse {
        message: "Healthcare RAG API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        rag_initialized: state.rag.is_initialized(),
    })
}

/// Knowledge base statistics; never triggers initialization.
///
/// Store failures are reported in the body as `status: error`.
pub async fn get_stats(State(state): State<AppState>) -> Json<RagStats> {
    info!("GET /api/stats");

    let Some(rag) = state.rag.cell.get() else {
        return Json(RagStats::not_initialized());
    };
    Json(rag.stats().await)
}

/// Answer a healthcare question
pub async fn query(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> std::result::Result<Json<QueryResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    validate_question(&req.question).map_err(client_error)?;
    if let Some(max_results) = req.max_results {
        validate_max_results(max_results, state.rag.max_results_limit).map_err(client_error)?;
    }
    info!("POST /api/query: {}", req.question);

    let rag = state.rag().await?;
    let max_results = req
        .max_results
        .unwrap_or_else(|| rag.default_max_results());
    let query = Query::new(req.question).with_max_results(max_results);

    match rag.query_with_options(query).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) if e.is_client_error() => Err(client_error(e)),
        Err(e) => {
            error!("Error processing query: {}", e);
            Err(ApiError::internal(QUERY_FAILED_DETAIL))
        }
    }
}

/// Add a document to the knowledge base
pub async fn add_document(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DocumentRequest>, JsonRejection>,
) -> std::result::Result<Json<DocumentResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    validate_content(&req.content).map_err(client_error)?;
    info!("POST /api/documents ({} chars)", req.content.chars().count());

    let rag = state.rag().await?;
    let metadata = metadata_from_json(req.metadata.unwrap_or_default());

    match rag.add_document(&req.content, metadata).await {
        Ok(document_id) => Ok(Json(DocumentResponse {
            message: "Document added successfully".to_string(),
            document_id,
        })),
        Err(e) if e.is_client_error() => Err(client_error(e)),
        Err(e) => {
            error!("Error adding document: {}", e);
            Err(ApiError::internal(ADD_FAILED_DETAIL))
        }
    }
}

fn client_error(e: HealthRagError) -> ApiError {
    ApiError::bad_request(e.to_string())
}
