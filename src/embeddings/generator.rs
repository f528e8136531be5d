//! Embedding generation service shared by the pipeline

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use super::client::EmbeddingClient;
use super::hashing::HashingEmbedder;
use super::Embedder;
use super::EmbeddingConfig;
use super::EmbeddingProvider;
use crate::errors::HealthRagError;
use crate::errors::Result;

/// Service for generating embeddings with a single shared model
#[derive(Clone)]
pub struct EmbeddingService {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingService {
    /// Build the configured provider once; it is reused for every request
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let embedding_config = EmbeddingConfig::from_app_config(config)?;
        Self::from_config(&embedding_config)
    }

    /// Create from custom config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = match config.provider {
            EmbeddingProvider::Local => {
                Arc::new(HashingEmbedder::new(config.model.clone(), config.dimension)?)
            }
            EmbeddingProvider::Ollama | EmbeddingProvider::OpenAI => {
                Arc::new(EmbeddingClient::new(config)?)
            }
        };

        info!(
            "Embedding model ready: {} ({:?}, {} dimensions)",
            config.model, config.provider, config.dimension
        );
        Ok(Self { embedder })
    }

    /// Wrap an existing embedder
    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Generate embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        // Preprocess text to handle newlines and invalid characters
        let processed_text = crate::embeddings::preprocess_text_for_embedding(text)?;

        let embedding = self.embedder.embed(&processed_text).await?;
        if embedding.len() != self.embedder.dimension() {
            return Err(HealthRagError::EmbeddingError(format!(
                "Dimension mismatch: expected {}, got {}",
                self.embedder.dimension(),
                embedding.len()
            )));
        }

        debug!("Generated {}-dimensional embedding", embedding.len());
        Ok(embedding)
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        self.embedder.model_name()
    }
}
