use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::errors::HealthRagError;
use crate::errors::Result;

/// Document metadata, e.g. `category` and `condition`
pub type Metadata = BTreeMap<String, String>;

/// Hex characters of the content digest kept in a document id
const DOCUMENT_ID_HEX_LEN: usize = 16;

/// Derive the stable identifier for a piece of content.
///
/// Identical content always maps to the same id, so re-adding a document
/// overwrites it instead of creating a duplicate.
pub fn document_id_for(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let hex = hex::encode(digest);
    format!("doc_{}", &hex[..DOCUMENT_ID_HEX_LEN])
}

/// A document held by the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        let content = content.into();
        Self {
            id: document_id_for(&content),
            content,
            metadata,
        }
    }
}

/// A single retrieved document with its distance and derived relevance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedMatch {
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
    pub relevance_score: f32,
}

/// Map a store distance onto a relevance score in (0, 1].
///
/// Strictly decreasing in distance; negative distances are treated as zero.
pub fn relevance_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

/// Answer to a question together with its evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    /// Most relevant first
    pub sources: Vec<RetrievedMatch>,
    pub confidence: f32,
}

/// Knowledge base statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagStats {
    pub document_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    pub status: String,
}

impl RagStats {
    pub const STATUS_ACTIVE: &'static str = "active";
    pub const STATUS_ERROR: &'static str = "error";
    pub const STATUS_NOT_INITIALIZED: &'static str = "not_initialized";

    pub fn error() -> Self {
        Self {
            document_count: 0,
            collection_name: None,
            embedding_model: None,
            status: Self::STATUS_ERROR.to_string(),
        }
    }

    pub fn not_initialized() -> Self {
        Self {
            document_count: 0,
            collection_name: None,
            embedding_model: None,
            status: Self::STATUS_NOT_INITIALIZED.to_string(),
        }
    }
}

/// Flatten a JSON object into string metadata.
///
/// Strings are kept as-is, nulls are dropped and every other value is
/// stored as its compact JSON text.
pub fn metadata_from_json(object: serde_json::Map<String, serde_json::Value>) -> Metadata {
    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

/// A question against the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    #[serde(default = "Query::default_max_results")]
    pub max_results: usize,
}

impl Query {
    pub const DEFAULT_MAX_RESULTS: usize = 3;

    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            max_results: Self::DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    const fn default_max_results() -> usize {
        Self::DEFAULT_MAX_RESULTS
    }
}

/// Reject a blank question
pub fn validate_question(question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(HealthRagError::InvalidInput(
            "Question cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reject a result count outside `1..=limit`
pub fn validate_max_results(max_results: usize, limit: usize) -> Result<()> {
    if max_results == 0 || max_results > limit {
        return Err(HealthRagError::InvalidInput(format!(
            "max_results must be between 1 and {limit}"
        )));
    }
    Ok(())
}

/// Reject blank document content
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(HealthRagError::InvalidInput(
            "Document content cannot be empty".to_string(),
        ));
    }
    Ok(())
}
