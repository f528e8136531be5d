//! In-process vector store with optional JSON snapshot persistence

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

use super::cosine_distance;
use super::DocumentStore;
use super::MetadataFilter;
use super::Neighbor;
use super::StoredDocument;
use crate::errors::HealthRagError;
use crate::errors::Result;

const BACKEND: &str = "memory";

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    collection: String,
    documents: Vec<StoredDocument>,
}

/// Brute-force cosine search over a concurrent map
pub struct MemoryStore {
    documents: DashMap<String, StoredDocument>,
    snapshot: Option<SnapshotFile>,
}

struct SnapshotFile {
    path: PathBuf,
    collection: String,
    /// Serializes snapshot writes and the map updates that follow them
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Volatile store; contents are lost when the process exits
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            snapshot: None,
        }
    }

    /// Store persisted to `{dir}/{collection}.json`, loading any existing snapshot
    pub async fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{collection}.json"));

        let documents = DashMap::new();
        if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            for doc in snapshot.documents {
                documents.insert(doc.id.clone(), doc);
            }
            info!(
                "Loaded {} documents from snapshot {}",
                documents.len(),
                path.display()
            );
        }

        Ok(Self {
            documents,
            snapshot: Some(SnapshotFile {
                path,
                collection: collection.to_string(),
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Path of the snapshot file, if persistence is enabled
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(|s| s.path.as_path())
    }

    fn stored_dimension(&self) -> Option<usize> {
        self.documents.iter().next().map(|e| e.value().embedding.len())
    }
}

impl SnapshotFile {
    async fn write(&self, mut documents: Vec<StoredDocument>) -> Result<()> {
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        let bytes = serde_json::to_vec(&Snapshot {
            collection: self.collection.clone(),
            documents,
        })?;

        // Write-then-rename so a crash never leaves a truncated snapshot
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted snapshot to {}", self.path.display());
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn upsert(&self, document: StoredDocument) -> Result<()> {
        if let Some(dim) = self.stored_dimension() {
            let replaces_only_entry =
                self.documents.len() == 1 && self.documents.contains_key(&document.id);
            if document.embedding.len() != dim && !replaces_only_entry {
                return Err(HealthRagError::store(
                    BACKEND,
                    format!(
                        "Embedding dimension {} does not match stored dimension {dim}",
                        document.embedding.len()
                    ),
                ));
            }
        }

        let Some(snapshot) = &self.snapshot else {
            self.documents.insert(document.id.clone(), document);
            return Ok(());
        };

        // The map only changes once the snapshot holding the new state is on disk
        let _guard = snapshot.write_lock.lock().await;
        let mut candidate: Vec<StoredDocument> = self
            .documents
            .iter()
            .filter(|e| e.key() != &document.id)
            .map(|e| e.value().clone())
            .collect();
        candidate.push(document.clone());
        snapshot.write(candidate).await?;

        self.documents.insert(document.id.clone(), document);
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
        if let Some(dim) = self.stored_dimension() {
            if embedding.len() != dim {
                return Err(HealthRagError::store(
                    BACKEND,
                    format!(
                        "Query dimension {} does not match stored dimension {dim}",
                        embedding.len()
                    ),
                ));
            }
        }

        let mut hits: Vec<Neighbor> = self
            .documents
            .iter()
            .filter(|e| filter.map_or(true, |f| f.matches(&e.value().metadata)))
            .map(|e| {
                let doc = e.value();
                Neighbor {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    distance: cosine_distance(embedding, &doc.embedding),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    async fn clear(&self) -> Result<()> {
        if let Some(snapshot) = &self.snapshot {
            let _guard = snapshot.write_lock.lock().await;
            snapshot.write(Vec::new()).await?;
            self.documents.clear();
        } else {
            self.documents.clear();
        }
        Ok(())
    }
}
