//! PostgreSQL vector store using the pgvector extension
//!
//! Each collection is one table:
//! `(id TEXT PRIMARY KEY, content TEXT, metadata JSONB, embedding vector(dim))`.
//! Search orders by the `<=>` cosine distance operator.

use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use sqlx::Row;
use tracing::debug;
use tracing::info;

use super::DocumentStore;
use super::MetadataFilter;
use super::Neighbor;
use super::StoredDocument;
use crate::config::AppConfig;
use crate::errors::HealthRagError;
use crate::errors::Result;
use crate::models::Metadata;

const BACKEND: &str = "postgres";

/// Vector store backed by one pgvector table
pub struct PgVectorStore {
    pool: PgPool,
    table: String,
    dimension: usize,
}

impl PgVectorStore {
    /// Connect using `store.database_url` and make sure the collection table exists
    pub async fn from_config(config: &AppConfig, dimension: usize) -> Result<Self> {
        let url = config.store.database_url.as_deref().ok_or_else(|| {
            HealthRagError::ConfigError(
                "store.database_url (or DATABASE_URL) is required for the postgres backend"
                    .to_string(),
            )
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.store.max_connections)
            .acquire_timeout(Duration::from_secs(config.store.connection_timeout))
            .connect(url)
            .await
            .map_err(map_err)?;

        info!(
            "Database pool configured: max_connections={}",
            config.store.max_connections
        );

        Self::from_pool(pool, &config.store.collection_name, dimension).await
    }

    /// Use an existing pool; creates the extension and table when missing
    pub async fn from_pool(pool: PgPool, collection: &str, dimension: usize) -> Result<Self> {
        let store = Self {
            pool,
            table: table_name(collection)?,
            dimension,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                id TEXT PRIMARY KEY, \
                content TEXT NOT NULL, \
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb, \
                embedding vector({}) NOT NULL\
            )",
            self.table, self.dimension
        );
        sqlx::query(&create_sql)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        debug!(table = %self.table, dimension = self.dimension, "pgvector table ready");
        Ok(())
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len == self.dimension {
            Ok(())
        } else {
            Err(HealthRagError::store(
                BACKEND,
                format!(
                    "Embedding dimension {len} does not match table dimension {}",
                    self.dimension
                ),
            ))
        }
    }
}

fn map_err(e: sqlx::Error) -> HealthRagError {
    HealthRagError::store(BACKEND, e.to_string())
}

/// Table name for a collection; only alphanumerics and underscores survive
fn table_name(collection: &str) -> Result<String> {
    let sanitized: String = collection
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        return Err(HealthRagError::store(
            BACKEND,
            format!("Collection name '{collection}' is empty after sanitization"),
        ));
    }
    Ok(format!("rag_{sanitized}"))
}

#[async_trait]
impl DocumentStore for PgVectorStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn upsert(&self, document: StoredDocument) -> Result<()> {
        self.check_dimension(document.embedding.len())?;

        let sql = format!(
            "INSERT INTO {} (id, content, metadata, embedding) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                content = EXCLUDED.content, \
                metadata = EXCLUDED.metadata, \
                embedding = EXCLUDED.embedding",
            self.table
        );

        sqlx::query(&sql)
            .bind(&document.id)
            .bind(&document.content)
            .bind(Json(&document.metadata))
            .bind(Vector::from(document.embedding))
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        debug!(table = %self.table, id = %document.id, "upserted document");
        Ok(())
    }

    async fn nearest(
        &self,
        embedding: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<Neighbor>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(embedding.len())?;

        let sql = format!(
            "SELECT id, content, metadata, (embedding <=> $1)::float8 AS distance \
             FROM {} \
             WHERE ($3::jsonb IS NULL OR metadata @> $3::jsonb) \
             ORDER BY embedding <=> $1, id \
             LIMIT $2",
            self.table
        );

        let filter_json = filter.map(|f| Json(&f.equals));
        let rows = sqlx::query(&sql)
            .bind(Vector::from(embedding.to_vec()))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(filter_json)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        rows.iter()
            .map(|row| {
                let Json(metadata): Json<Metadata> =
                    row.try_get("metadata").map_err(map_err)?;
                let distance: f64 = row.try_get("distance").map_err(map_err)?;
                Ok(Neighbor {
                    id: row.try_get("id").map_err(map_err)?,
                    content: row.try_get("content").map_err(map_err)?,
                    metadata,
                    distance: distance as f32,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn clear(&self) -> Result<()> {
        let sql = format!("TRUNCATE TABLE {}", self.table);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        info!("Cleared table {}", self.table);
        Ok(())
    }
}
