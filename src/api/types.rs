//! API request and response types

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use crate::models::Metadata;
use crate::models::QueryResult;
use crate::models::RetrievedMatch;

pub const INIT_FAILED_DETAIL: &str = "Failed to initialize RAG system. Please check server logs.";
pub const QUERY_FAILED_DETAIL: &str = "Query processing failed. Please try again.";
pub const ADD_FAILED_DETAIL: &str = "Failed to add document. Please try again.";

/// Root endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rag_initialized: bool,
}

/// Query request
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// One source of a query answer
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceResponse {
    pub content: String,
    pub metadata: Metadata,
    pub relevance_score: f32,
}

impl From<RetrievedMatch> for SourceResponse {
    fn from(m: RetrievedMatch) -> Self {
        Self {
            content: m.content,
            metadata: m.metadata,
            relevance_score: m.relevance_score,
        }
    }
}

/// Query response
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceResponse>,
    pub confidence: f32,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            answer: result.answer,
            sources: result.sources.into_iter().map(Into::into).collect(),
            confidence: result.confidence,
        }
    }
}

/// Add-document request; metadata values may be any JSON value
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Add-document response
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub message: String,
    pub document_id: String,
}

/// Error body: `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Handler error carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}
