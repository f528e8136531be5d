//! Vector store backends holding documents and their embeddings
//!
//! - `memory`: in-process map with optional JSON snapshot persistence
//! - `postgres`: PostgreSQL with the pgvector extension
//!
//! Both backends rank by cosine distance (`1 - cosine similarity`), so
//! distances fall in `[0, 2]` and relevance scores are comparable across them.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use memory::MemoryStore;
pub use postgres::PgVectorStore;

use crate::config::AppConfig;
use crate::errors::HealthRagError;
use crate::errors::Result;
use crate::models::Document;
use crate::models::Metadata;

/// A document as persisted by a store, with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

impl StoredDocument {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            id: document.id,
            content: document.content,
            metadata: document.metadata,
            embedding,
        }
    }
}

/// A nearest-neighbor hit
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
}

/// Exact-match constraints on metadata values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub equals: Metadata,
}

impl MetadataFilter {
    pub fn field_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut equals = Metadata::new();
        equals.insert(key.into(), value.into());
        Self { equals }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.equals
            .iter()
            .all(|(k, v)| metadata.get(k).is_some_and(|m| m == v))
    }
}

/// Storage backend for document vectors with nearest-neighbor search
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Insert a document, replacing any document with the same id
    async fn upsert(&self, document: StoredDocument) -> Result<()>;

    /// Up to `limit` documents closest to `embedding`, ordered by ascending distance
    async fn nearest(
        &self,
        embedding: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Neighbor>>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;

    /// Remove every document
    async fn clear(&self) -> Result<()>;
}

/// Cosine distance in `[0, 2]`; zero-magnitude vectors are at distance 1
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}

/// Open the store selected by `store.backend`
pub async fn open_store(config: &AppConfig, dimension: usize) -> Result<Arc<dyn DocumentStore>> {
    let store = &config.store;
    match store.backend.trim().to_ascii_lowercase().as_str() {
        "memory" => {
            let memory = match config.persist_dir() {
                Some(dir) => MemoryStore::open(dir, &store.collection_name).await?,
                None => MemoryStore::new(),
            };
            Ok(Arc::new(memory))
        }
        "postgres" | "pgvector" => {
            let pg = PgVectorStore::from_config(config, dimension).await?;
            Ok(Arc::new(pg))
        }
        other => Err(HealthRagError::ConfigError(format!(
            "Unknown store backend '{other}' (expected memory or postgres)"
        ))),
    }
}
