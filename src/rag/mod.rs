//! Retrieval pipeline for healthcare questions
//!
//! This module answers free-text questions from a vector store:
//! - Keyword routing of questions to a document type
//! - Nearest-neighbor retrieval with `1 / (1 + distance)` relevance scoring
//! - Extractive answer composition from the top matches
//! - Optional Wikipedia fallback when nothing matches locally
//! - Ingestion of text files and CSV tables
//!
//! # Examples
//!
//! ```rust,no_run
//! use healthrag::rag::HealthcareRag;
//! use healthrag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let rag = HealthcareRag::from_config(&config).await?;
//!
//!     let result = rag.query("What is hypertension?", 3).await?;
//!     println!("Answer: {}", result.answer);
//!     println!("Confidence: {:.2}", result.confidence);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod routing;
pub mod seed;
pub mod tables;
pub mod web;

pub use context::AnswerComposer;
pub use pipeline::HealthcareRag;
pub use web::WebLookup;
