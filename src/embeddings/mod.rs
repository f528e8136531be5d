//! Embeddings generation module
//!
//! This module provides text embeddings through several providers:
//! - Local feature-hashing model (no network, deterministic)
//! - Ollama (local models over HTTP)
//! - OpenAI-compatible endpoints
//!
//! # Examples
//!
//! ```rust,no_run
//! use healthrag::embeddings::EmbeddingService;
//! use healthrag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.generate("What is hypertension?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod hashing;
pub mod text_preprocessing;

use std::str::FromStr;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use hashing::HashingEmbedder;
pub use text_preprocessing::generate_text_chunks;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::errors::HealthRagError;
use crate::errors::Result;

/// A model that maps text to a fixed-length vector.
///
/// One instance is built at startup and shared read-only across requests.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single, already preprocessed text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this model produces
    fn dimension(&self) -> usize;

    /// Identifier reported in statistics
    fn model_name(&self) -> &str;
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// In-process feature hashing
    Local,
    /// Ollama `/api/embeddings`
    Ollama,
    /// `OpenAI` `/embeddings`
    OpenAI,
}

impl FromStr for EmbeddingProvider {
    type Err = HealthRagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "hash" | "hashing" => Ok(Self::Local),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            other => Err(HealthRagError::ConfigError(format!(
                "Unknown embedding provider '{other}' (expected local, ollama or openai)"
            ))),
        }
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let embeddings = &config.embeddings;
        let provider: EmbeddingProvider = embeddings.provider.parse()?;

        let api_key = embeddings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty());
        if provider == EmbeddingProvider::OpenAI && api_key.is_none() {
            return Err(HealthRagError::ConfigError(
                "OpenAI embeddings require embeddings.api_key".to_string(),
            ));
        }

        Ok(Self {
            provider,
            model: embeddings.model.clone(),
            dimension: embeddings.dimension,
            endpoint: embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs: embeddings.timeout_secs,
        })
    }
}
