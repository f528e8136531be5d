//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use healthrag::embeddings::Embedder;
use healthrag::embeddings::EmbeddingService;
use healthrag::store::DocumentStore;
use healthrag::store::MemoryStore;
use healthrag::store::MetadataFilter;
use healthrag::store::Neighbor;
use healthrag::store::StoredDocument;
use healthrag::AppConfig;
use healthrag::HealthRagError;
use healthrag::HealthcareRag;
use healthrag::Result;

/// Terms the keyword embedder counts, one axis each after the bias axis
const VOCABULARY: &[&str] = &[
    "hypertension",
    "diabetes",
    "asthma",
    "depression",
    "osteoarthritis",
    "migraine",
    "reflux",
    "kidney",
    "fibrillation",
    "rhinitis",
    "pneumonia",
];

pub const INTERNAL_DETAIL: &str = "connection refused by secret-host:5432";

/// Embeds text as keyword counts plus a small constant bias, so a question
/// naming one condition lands at distance ~0 from that condition's document
/// and ~0.9 or more from every other one
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector = vec![0.1_f32];
        vector.extend(
            VOCABULARY
                .iter()
                .map(|term| lower.matches(term).count() as f32),
        );
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        VOCABULARY.len() + 1
    }

    fn model_name(&self) -> &str {
        "keyword-stub"
    }
}

/// Embedder whose every call fails with an internal-looking message
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(HealthRagError::EmbeddingError(INTERNAL_DETAIL.to_string()))
    }

    fn dimension(&self) -> usize {
        VOCABULARY.len() + 1
    }

    fn model_name(&self) -> &str {
        "failing-stub"
    }
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn upsert(&self, _document: StoredDocument) -> Result<()> {
        Err(HealthRagError::store("failing", INTERNAL_DETAIL))
    }

    async fn nearest(
        &self,
        _embedding: &[f32],
        _limit: usize,
        _filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Neighbor>> {
        Err(HealthRagError::store("failing", INTERNAL_DETAIL))
    }

    async fn count(&self) -> Result<usize> {
        Err(HealthRagError::store("failing", INTERNAL_DETAIL))
    }

    async fn clear(&self) -> Result<()> {
        Err(HealthRagError::store("failing", INTERNAL_DETAIL))
    }
}

/// Default configuration without a snapshot directory
pub fn volatile_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.persist_dir = None;
    config
}

pub fn test_config() -> AppConfig {
    let mut config = volatile_config();
    config.retrieval.seed_on_empty = false;
    config
}

/// Pipeline over the keyword embedder and the given store
pub fn keyword_rag_with_store(config: &AppConfig, store: Arc<dyn DocumentStore>) -> HealthcareRag {
    let embeddings = EmbeddingService::with_embedder(Arc::new(KeywordEmbedder));
    HealthcareRag::new(config, embeddings, store).unwrap()
}

/// Empty pipeline over the keyword embedder and a volatile memory store
pub fn keyword_rag() -> HealthcareRag {
    keyword_rag_with_store(&test_config(), Arc::new(MemoryStore::new()))
}

/// Keyword pipeline holding the ten sample documents
pub async fn seeded_rag() -> HealthcareRag {
    let rag = keyword_rag();
    rag.seed().await.unwrap();
    rag
}

pub fn failing_embedder_rag() -> HealthcareRag {
    let embeddings = EmbeddingService::with_embedder(Arc::new(FailingEmbedder));
    HealthcareRag::new(&test_config(), embeddings, Arc::new(MemoryStore::new())).unwrap()
}

pub fn failing_store_rag() -> HealthcareRag {
    keyword_rag_with_store(&test_config(), Arc::new(FailingStore))
}

pub const PNEUMONIA: &str = "Pneumonia is an infection that inflames the air sacs in one or both lungs, which may fill with fluid. Symptoms include cough with phlegm, fever, chills, and difficulty breathing. Treatment depends on the cause and may include antibiotics, antivirals, rest, and fluids.";
