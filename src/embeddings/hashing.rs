//! Deterministic feature-hashing embedder
//!
//! Maps each content word to a signed bucket of a fixed-size vector and
//! L2-normalizes the result. It needs no model download or network access,
//! and identical text always yields an identical vector.

use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha256;

use super::Embedder;
use crate::errors::HealthRagError;
use crate::errors::Result;

/// Words carrying no topical signal
const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by",
    "can", "could", "do", "does", "for", "from", "had", "has", "have", "how", "i", "if", "in",
    "into", "is", "it", "its", "like", "may", "me", "more", "most", "my", "no", "not", "of", "on",
    "or", "other", "our", "should", "so", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "to", "too", "us", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "why", "will", "with", "would",
    "you", "your",
];

/// Local embedding model based on the hashing trick
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model: String,
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(model: impl Into<String>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(HealthRagError::ConfigError(
                "Hashing embedder dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            model: model.into(),
            dimension,
        })
    }

    /// Compute the embedding synchronously
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        hash_embed(text, self.dimension)
    }
}

/// Lower-cased alphanumeric words with stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0_f32; dimension];

    for token in tokenize(text) {
        let digest = Sha256::digest(token.as_bytes());
        let mut bucket_bytes = [0_u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        // No usable tokens: every such text shares one fixed direction
        vector[0] = 1.0;
        return vector;
    }

    for x in &mut vector {
        *x /= norm;
    }
    vector
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_string();
        let dimension = self.dimension;
        tokio::task::spawn_blocking(move || hash_embed(&text, dimension))
            .await
            .map_err(|e| HealthRagError::EmbeddingError(format!("Embedding task failed: {e}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_tokenize_drops_stop_words() {
        assert_eq!(tokenize("What is Hypertension?"), vec!["hypertension"]);
        assert_eq!(
            tokenize("Type 2 diabetes, blood-sugar"),
            vec!["type", "diabetes", "blood", "sugar"]
        );
    }

    #[test]
    fn test_embedding_is_normalized() {
        let embedder = HashingEmbedder::new("feature-hash-v1", 256).unwrap();
        let v = embedder.embed_sync("Asthma causes wheezing and shortness of breath");
        assert_eq!(v.len(), 256);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = HashingEmbedder::new("feature-hash-v1", 512).unwrap();
        let a = embedder.embed_sync("Migraine headaches are severe");
        let b = embedder.embed_sync("Migraine headaches are severe");
        assert_eq!(a, b);
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stop_word_only_text_has_fixed_direction() {
        let embedder = HashingEmbedder::new("feature-hash-v1", 64).unwrap();
        let v = embedder.embed_sync("what is the");
        assert!((v[0] - 1.0).abs() < f32::EPSILON);
        assert!(v[1..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingEmbedder::new("feature-hash-v1", 0).is_err());
    }

    #[tokio::test]
    async fn test_async_embed_matches_sync() {
        let embedder = HashingEmbedder::new("feature-hash-v1", 128).unwrap();
        let sync = embedder.embed_sync("chronic kidney disease");
        let async_result = embedder.embed("chronic kidney disease").await.unwrap();
        assert_eq!(sync, async_result);
        assert_eq!(embedder.model_name(), "feature-hash-v1");
    }
}
