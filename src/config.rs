use std::collections::HashMap;
use std::path::Path;

use config::Config;
use config::Environment;
use config::File;
use config::FileFormat;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

/// Prefix for structured environment overrides, e.g. `HEALTHRAG__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "HEALTHRAG";

/// Snapshot directory used when none is configured
pub const DEFAULT_PERSIST_DIR: &str = "./vector_db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Also write a daily-rolling log file under `log_dir`
    pub file_output: bool,
    pub log_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `local`, `ollama` or `openai`
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `memory` or `postgres`
    pub backend: String,
    pub collection_name: String,
    /// Snapshot directory for the memory backend; `None` or an empty string
    /// keeps documents in-process only
    #[serde(default)]
    pub persist_dir: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub default_max_results: usize,
    pub max_results_limit: usize,
    /// Characters of content kept in each returned source
    pub source_preview_chars: usize,
    /// Number of top matches quoted in the composed answer
    pub answer_documents: usize,
    pub seed_on_empty: bool,
    /// Upper bound on chunk size when ingesting files
    pub chunk_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternetConfig {
    /// Only consulted when local retrieval returns no matches
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub internet: InternetConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default file path and the process environment
    pub fn load() -> crate::Result<Self> {
        if Path::new("config.toml").exists() {
            Self::load_from(Some(Path::new("config.toml")))
        } else if Path::new("config.example.toml").exists() {
            warn!("Using config.example.toml. Please create config.toml for production use.");
            Self::load_from(Some(Path::new("config.example.toml")))
        } else {
            Self::load_from(None)
        }
    }

    /// Load configuration from an explicit file and the process environment
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        Self::build(path, &std::env::vars().collect())
    }

    /// Layer defaults, an optional TOML file and environment variables.
    ///
    /// Precedence, lowest first: built-in defaults, the file,
    /// `HEALTHRAG__SECTION__KEY` variables, then the short legacy variables
    /// `EMBEDDING_MODEL`, `VECTOR_STORE_DIR` (or `CHROMA_PERSIST_DIR`),
    /// `DATABASE_URL` and `USE_INTERNET`.
    pub fn build(path: Option<&Path>, env: &HashMap<String, String>) -> crate::Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let env_source: config::Map<String, String> = env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env_source)),
        );

        builder = builder
            .set_override_option("embeddings.model", env.get("EMBEDDING_MODEL").cloned())?
            .set_override_option(
                "store.persist_dir",
                env.get("VECTOR_STORE_DIR")
                    .or_else(|| env.get("CHROMA_PERSIST_DIR"))
                    .cloned(),
            )?
            .set_override_option("store.database_url", env.get("DATABASE_URL").cloned())?
            .set_override_option(
                "internet.enabled",
                env.get("USE_INTERNET").map(|v| parse_flag(v)),
            )?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot work at all
    pub fn validate(&self) -> crate::Result<()> {
        if self.embeddings.dimension == 0 {
            return Err(crate::HealthRagError::ConfigError(
                "embeddings.dimension must be greater than zero".to_string(),
            ));
        }
        if self.retrieval.default_max_results == 0
            || self.retrieval.default_max_results > self.retrieval.max_results_limit
        {
            return Err(crate::HealthRagError::ConfigError(format!(
                "retrieval.default_max_results must be within 1..={}",
                self.retrieval.max_results_limit
            )));
        }
        if self.retrieval.chunk_chars == 0 {
            return Err(crate::HealthRagError::ConfigError(
                "retrieval.chunk_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get the vector store collection name
    pub fn collection_name(&self) -> &str {
        &self.store.collection_name
    }

    /// Snapshot directory for the memory backend, if persistence is on
    pub fn persist_dir(&self) -> Option<&str> {
        self.store
            .persist_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
    }

    /// Check if the internet fallback is enabled
    pub fn internet_enabled(&self) -> bool {
        self.internet.enabled
    }

    /// Socket address the API server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Interpret `1`, `true` and `yes` (any case) as enabled
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                enable_cors: true,
                max_body_bytes: 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_output: false,
                log_dir: "logs".to_string(),
            },
            embeddings: EmbeddingsConfig {
                provider: "local".to_string(),
                model: "feature-hash-v1".to_string(),
                dimension: 1024,
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
                timeout_secs: 30,
            },
            store: StoreConfig {
                backend: "memory".to_string(),
                collection_name: "healthcare_documents".to_string(),
                persist_dir: Some(DEFAULT_PERSIST_DIR.to_string()),
                database_url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            retrieval: RetrievalConfig {
                default_max_results: 3,
                max_results_limit: 50,
                source_preview_chars: 200,
                answer_documents: 2,
                seed_on_empty: true,
                chunk_chars: 1000,
            },
            internet: InternetConfig {
                enabled: false,
                endpoint: "https://en.wikipedia.org".to_string(),
                timeout_secs: 5,
            },
        }
    }
}
