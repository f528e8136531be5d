use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthRagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store error ({backend}): {message}")]
    StoreError { backend: String, message: String },

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sanitized query failure; the underlying cause is only logged.
    #[error("Query processing failed. Please try again.")]
    RetrievalFailed,

    /// Sanitized ingest failure; the underlying cause is only logged.
    #[error("Failed to add document. Please try again.")]
    IngestFailed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Config loading error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HealthRagError {
    pub fn store(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreError {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Errors caused by the caller's input rather than by a downstream service
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, HealthRagError>;
