//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `healthrag` CLI

use crate::models::QueryResult;
use crate::models::RagStats;
use crate::rag::context::source_preview;
use crate::AppConfig;

/// Print a query answer with its sources
pub fn print_query_result(question: &str, result: &QueryResult) {
    println!("❓ {question}");
    println!();
    println!("{}", result.answer);
    println!();
    println!("Confidence: {:.3}", result.confidence);

    if result.sources.is_empty() {
        return;
    }
    println!();
    println!("Sources ({}):", result.sources.len());
    for (idx, source) in result.sources.iter().enumerate() {
        let condition = source
            .metadata
            .get("condition")
            .or_else(|| source.metadata.get("source"))
            .map_or("-", String::as_str);
        println!(
            "  {}. [{}] score {:.3} | {}",
            idx + 1,
            condition,
            source.relevance_score,
            source_preview(&source.content, 80)
        );
    }
}

/// Print knowledge base statistics
pub fn print_stats(stats: &RagStats) {
    println!("📊 Knowledge Base Statistics");
    println!("===========================");
    println!("  Status: {}", stats.status);
    println!("  Documents: {}", stats.document_count);
    if let Some(collection) = &stats.collection_name {
        println!("  Collection: {collection}");
    }
    if let Some(model) = &stats.embedding_model {
        println!("  Embedding model: {model}");
    }
}

/// Print the effective configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    println!("📋 Healthcare RAG Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Bind address: {}", config.bind_address());
    println!("  CORS: {}", config.server.enable_cors);
    println!("  Max body: {} bytes", config.server.max_body_bytes);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!(
        "  File output: {} ({})",
        config.logging.file_output, config.logging.log_dir
    );
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!(
        "  API key: {}",
        if config.embeddings.api_key.is_some() {
            "***set***"
        } else {
            "not set"
        }
    );
    println!();

    println!("🗄️  Store:");
    println!("  Backend: {}", config.store.backend);
    println!("  Collection: {}", config.collection_name());
    println!(
        "  Persist dir: {}",
        config.persist_dir().unwrap_or("(in-memory only)")
    );
    println!(
        "  Database URL: {}",
        config
            .store
            .database_url
            .as_deref()
            .map_or_else(|| "not set".to_string(), mask_database_url)
    );
    println!();

    println!("🔎 Retrieval:");
    println!(
        "  Default results: {} (limit {})",
        config.retrieval.default_max_results, config.retrieval.max_results_limit
    );
    println!("  Seed on empty: {}", config.retrieval.seed_on_empty);
    println!("  Chunk size: {} chars", config.retrieval.chunk_chars);
    println!();

    println!("🌍 Internet fallback:");
    println!("  Enabled: {}", config.internet_enabled());
    println!("  Endpoint: {}", config.internet.endpoint);
}

/// Hide the password of a database URL
pub fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            format!(
                "{}://{}@{}:{}{}",
                parsed.scheme(),
                parsed.username(),
                host,
                parsed.port().unwrap_or(5432),
                parsed.path()
            )
        } else {
            "***masked***".to_string()
        }
    } else {
        "***invalid***".to_string()
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
