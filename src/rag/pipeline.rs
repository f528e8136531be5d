//! Complete retrieval pipeline: Embed -> Search -> Score -> Compose

use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::generate_text_chunks;
use crate::embeddings::EmbeddingService;
use crate::errors::HealthRagError;
use crate::errors::Result;
use crate::models::validate_content;
use crate::models::validate_max_results;
use crate::models::validate_question;
use crate::models::Document;
use crate::models::Metadata;
use crate::models::Query;
use crate::models::QueryResult;
use crate::models::RagStats;
use crate::models::RetrievedMatch;
use crate::rag::context::AnswerComposer;
use crate::rag::context::NO_MATCH_ANSWER;
use crate::rag::routing::document_type_for_source;
use crate::rag::routing::filter_for_question;
use crate::rag::seed::SEED_DOCUMENTS;
use crate::rag::tables::table_rows;
use crate::rag::web::WebLookup;
use crate::store::open_store;
use crate::store::DocumentStore;
use crate::store::Neighbor;
use crate::store::StoredDocument;

/// Healthcare question answering over a vector store
pub struct HealthcareRag {
    embeddings: EmbeddingService,
    store: Arc<dyn DocumentStore>,
    composer: AnswerComposer,
    web: Option<WebLookup>,
    collection_name: String,
    default_max_results: usize,
    max_results_limit: usize,
    chunk_chars: usize,
}

impl HealthcareRag {
    /// Build the embedding model and store from configuration, then seed an
    /// empty knowledge base when `retrieval.seed_on_empty` is set
    ///
    /// # Errors
    /// - Embedding provider configuration errors
    /// - Store connection or snapshot loading errors
    /// - Seeding failures
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let embeddings = EmbeddingService::new(config)?;
        let store = open_store(config, embeddings.dimension()).await?;
        let rag = Self::new(config, embeddings, store)?;

        if config.retrieval.seed_on_empty {
            let added = rag.seed_if_empty().await?;
            if added > 0 {
                info!("Added {} sample documents to knowledge base", added);
            }
        }

        info!(
            "RAG system ready: collection={}, backend={}, model={}",
            rag.collection_name,
            rag.store.backend(),
            rag.embeddings.model()
        );
        Ok(rag)
    }

    /// Create from existing services
    pub fn new(
        config: &AppConfig,
        embeddings: EmbeddingService,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        let web = if config.internet_enabled() {
            Some(WebLookup::new(&config.internet)?)
        } else {
            None
        };

        Ok(Self {
            embeddings,
            store,
            composer: AnswerComposer::new(
                config.retrieval.answer_documents,
                config.retrieval.source_preview_chars,
            ),
            web,
            collection_name: config.collection_name().to_string(),
            default_max_results: config.retrieval.default_max_results,
            max_results_limit: config.retrieval.max_results_limit,
            chunk_chars: config.retrieval.chunk_chars,
        })
    }

    /// Answer a question using up to `max_results` documents
    ///
    /// # Errors
    /// - `InvalidInput` for an empty question or out-of-range `max_results`
    /// - `RetrievalFailed` when embedding or search fails
    pub async fn query(&self, question: &str, max_results: usize) -> Result<QueryResult> {
        self.query_with_options(Query::new(question).with_max_results(max_results))
            .await
    }

    /// Answer a query
    ///
    /// # Errors
    /// - `InvalidInput` for an empty question or out-of-range `max_results`
    /// - `RetrievalFailed` when embedding or search fails
    pub async fn query_with_options(&self, query: Query) -> Result<QueryResult> {
        validate_question(&query.question)?;
        validate_max_results(query.max_results, self.max_results_limit)?;
        let question = query.question.trim();

        info!("Processing query: {}", question);

        let neighbors = self
            .retrieve(question, query.max_results)
            .await
            .map_err(|e| {
                error!("Query processing failed: {}", e);
                HealthRagError::RetrievalFailed
            })?;
        debug!("Retrieved {} documents", neighbors.len());

        if neighbors.is_empty() {
            return Ok(self.answer_without_matches(question).await);
        }

        let answer = self.composer.compose(&neighbors);
        let sources: Vec<RetrievedMatch> = neighbors
            .iter()
            .map(|n| self.composer.to_source(n))
            .collect();
        let confidence = sources.first().map_or(0.0, |s| s.relevance_score);

        Ok(QueryResult {
            answer,
            sources,
            confidence,
        })
    }

    /// Nearest documents for a question, honoring keyword routing
    async fn retrieve(&self, question: &str, limit: usize) -> Result<Vec<Neighbor>> {
        let embedding = self.embeddings.generate(question).await?;

        let mut neighbors = match filter_for_question(question) {
            Some(filter) => {
                debug!("Routing query with filter {:?}", filter.equals);
                let filtered = self.store.nearest(&embedding, limit, Some(&filter)).await?;
                if filtered.is_empty() {
                    debug!("No routed matches, searching all documents");
                    self.store.nearest(&embedding, limit, None).await?
                } else {
                    filtered
                }
            }
            None => self.store.nearest(&embedding, limit, None).await?,
        };

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(neighbors)
    }

    async fn answer_without_matches(&self, question: &str) -> QueryResult {
        let Some(web) = &self.web else {
            return QueryResult {
                answer: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
            };
        };

        let found = web.lookup(question).await;
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "internet".to_string());
        QueryResult {
            answer: found.answer,
            sources: vec![RetrievedMatch {
                content: found.source,
                metadata,
                distance: 0.0,
                relevance_score: 0.0,
            }],
            confidence: 0.0,
        }
    }

    /// Add a document and return its content-derived id
    ///
    /// # Errors
    /// - `InvalidInput` for empty content
    /// - `IngestFailed` when embedding or storage fails
    pub async fn add_document(&self, content: &str, metadata: Metadata) -> Result<String> {
        validate_content(content)?;

        let document = Document::new(content, metadata);
        let id = document.id.clone();
        self.store_document(document).await.map_err(|e| {
            error!("Failed to add document {}: {}", id, e);
            HealthRagError::IngestFailed
        })?;

        debug!("Added document {}", id);
        Ok(id)
    }

    async fn store_document(&self, document: Document) -> Result<()> {
        let embedding = self.embeddings.generate(&document.content).await?;
        self.store
            .upsert(StoredDocument::new(document, embedding))
            .await
    }

    /// Knowledge base statistics; store failures are reported as `status: error`
    pub async fn stats(&self) -> RagStats {
        match self.store.count().await {
            Ok(document_count) => RagStats {
                document_count,
                collection_name: Some(self.collection_name.clone()),
                embedding_model: Some(self.embeddings.model().to_string()),
                status: RagStats::STATUS_ACTIVE.to_string(),
            },
            Err(e) => {
                error!("Failed to get stats: {}", e);
                RagStats::error()
            }
        }
    }

    /// Number of stored documents
    pub async fn document_count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Add the sample documents when the store is empty; returns how many were added
    pub async fn seed_if_empty(&self) -> Result<usize> {
        if self.store.count().await? > 0 {
            return Ok(0);
        }
        Ok(self.seed().await?.len())
    }

    /// Add the sample documents unconditionally
    pub async fn seed(&self) -> Result<Vec<String>> {
        info!("Adding sample healthcare documents...");
        let mut ids = Vec::with_capacity(SEED_DOCUMENTS.len());
        for doc in SEED_DOCUMENTS {
            ids.push(self.add_document(doc.content, doc.metadata()).await?);
        }
        Ok(ids)
    }

    /// Split a text file into chunks and add each as a document
    ///
    /// Each chunk is tagged with `source_file`, `chunk` and a `type` derived
    /// from the source name unless `metadata` already sets one.
    pub async fn ingest_text(
        &self,
        source_name: &str,
        text: &str,
        metadata: Metadata,
    ) -> Result<Vec<String>> {
        let chunks = generate_text_chunks(text, self.chunk_chars)?;
        let doc_type = document_type_for_source(source_name);
        info!(
            "Ingesting {} as {} ({} chunks)",
            source_name,
            doc_type,
            chunks.len()
        );

        let mut ids = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let mut chunk_metadata = metadata.clone();
            chunk_metadata.insert("source_file".to_string(), source_name.to_string());
            chunk_metadata.insert("chunk".to_string(), index.to_string());
            chunk_metadata
                .entry("type".to_string())
                .or_insert_with(|| doc_type.to_string());
            ids.push(self.add_document(chunk, chunk_metadata).await?);
        }
        Ok(ids)
    }

    /// Add each non-empty row of a CSV table as its own document
    ///
    /// Rows are tagged with `source_file`, `row` and a `type` derived from the
    /// source name unless `metadata` already sets one. Values read from the
    /// row itself, such as a Q&A `source`, take precedence over `metadata`.
    pub async fn ingest_table(
        &self,
        source_name: &str,
        text: &str,
        metadata: Metadata,
    ) -> Result<Vec<String>> {
        let rows = table_rows(source_name, text)?;
        if rows.is_empty() {
            return Err(HealthRagError::InvalidInput(format!(
                "No rows with content in {source_name}"
            )));
        }
        let doc_type = document_type_for_source(source_name);
        info!(
            "Ingesting {} as {} ({} rows)",
            source_name,
            doc_type,
            rows.len()
        );

        let mut ids = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let mut row_metadata = metadata.clone();
            row_metadata.extend(row.metadata);
            row_metadata.insert("source_file".to_string(), source_name.to_string());
            row_metadata.insert("row".to_string(), index.to_string());
            row_metadata
                .entry("type".to_string())
                .or_insert_with(|| doc_type.to_string());
            ids.push(self.add_document(&row.content, row_metadata).await?);
        }
        Ok(ids)
    }

    /// Remove every document from the collection
    pub async fn clear(&self) -> Result<()> {
        warn!("Clearing collection {}", self.collection_name);
        self.store.clear().await
    }

    /// Result count used when a query does not name one
    #[must_use]
    pub fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    #[must_use]
    pub fn max_results_limit(&self) -> usize {
        self.max_results_limit
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    #[must_use]
    pub fn embedding_model(&self) -> &str {
        self.embeddings.model()
    }

    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }
}
