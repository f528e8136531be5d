mod common;

use std::sync::Arc;

use axum::extract::Path;
use axum::routing::get;
use axum::Json;
use axum::Router;
use common::*;
use healthrag::models::Metadata;
use healthrag::models::RagStats;
use healthrag::rag::context::ANSWER_PREFIX;
use healthrag::rag::context::NO_MATCH_ANSWER;
use healthrag::rag::seed::SEED_DOCUMENTS;
use healthrag::rag::web::NO_SUMMARY_ANSWER;
use healthrag::store::DocumentStore;
use healthrag::store::MemoryStore;
use healthrag::AppConfig;
use healthrag::HealthRagError;
use healthrag::HealthcareRag;
use healthrag::Result;
use serde_json::json;

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn test_seeded_query_finds_hypertension() -> Result<()> {
    let rag = seeded_rag().await;

    let result = rag.query("What is hypertension?", 3).await?;

    assert_eq!(result.sources.len(), 3);
    assert_eq!(result.sources[0].metadata["condition"], "hypertension");
    assert!(result.sources[0].relevance_score > 0.9);
    assert!((result.confidence - result.sources[0].relevance_score).abs() < f32::EPSILON);
    for pair in result.sources.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
    Ok(())
}

#[tokio::test]
async fn test_answer_quotes_top_documents_and_conditions() -> Result<()> {
    let rag = seeded_rag().await;

    let result = rag.query("What is hypertension?", 3).await?;

    assert!(result.answer.starts_with(ANSWER_PREFIX));
    assert!(result.answer.contains(SEED_DOCUMENTS[0].content));
    assert!(result
        .answer
        .contains("\n\nRelated conditions: hypertension, "));
    Ok(())
}

#[tokio::test]
async fn test_sources_are_previews() -> Result<()> {
    let rag = seeded_rag().await;

    let result = rag.query("What is hypertension?", 1).await?;

    let preview = &result.sources[0].content;
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 203);
    assert!(SEED_DOCUMENTS[0]
        .content
        .starts_with(preview.trim_end_matches("...")));
    Ok(())
}

#[tokio::test]
async fn test_exact_content_query_with_local_model() -> Result<()> {
    let rag = HealthcareRag::from_config(&volatile_config()).await?;
    assert_eq!(rag.document_count().await?, 10);

    let asthma = SEED_DOCUMENTS
        .iter()
        .find(|d| d.condition == "asthma")
        .unwrap();
    let result = rag.query(asthma.content, 3).await?;

    assert_eq!(result.sources[0].metadata["condition"], "asthma");
    assert!(result.sources[0].relevance_score > 0.9);
    Ok(())
}

#[tokio::test]
async fn test_add_same_content_twice() -> Result<()> {
    let rag = seeded_rag().await;

    let first = rag
        .add_document(PNEUMONIA, metadata(&[("condition", "pneumonia")]))
        .await?;
    let second = rag
        .add_document(PNEUMONIA, metadata(&[("condition", "pneumonia")]))
        .await?;

    assert_eq!(first, second);
    assert!(first.starts_with("doc_"));
    assert_eq!(rag.document_count().await?, 11);
    Ok(())
}

#[tokio::test]
async fn test_added_document_is_retrievable() -> Result<()> {
    let rag = seeded_rag().await;
    rag.add_document(
        PNEUMONIA,
        metadata(&[("condition", "pneumonia"), ("category", "respiratory")]),
    )
    .await?;

    let result = rag.query("pneumonia", 3).await?;

    assert_eq!(result.sources[0].metadata["condition"], "pneumonia");
    assert!(result.sources[0].relevance_score > 0.9);
    Ok(())
}

#[tokio::test]
async fn test_invalid_queries_are_client_errors() {
    let rag = seeded_rag().await;

    for (question, max_results) in [("", 3), ("   ", 3), ("asthma", 0), ("asthma", 51)] {
        let err = rag.query(question, max_results).await.unwrap_err();
        assert!(
            matches!(err, HealthRagError::InvalidInput(_)),
            "{question:?}/{max_results} gave {err}"
        );
    }

    let err = rag.add_document("  \n", Metadata::new()).await.unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_empty_store_gives_no_match_answer() -> Result<()> {
    let rag = keyword_rag();

    let result = rag.query("What is hypertension?", 3).await?;

    assert_eq!(result.answer, NO_MATCH_ANSWER);
    assert!(result.sources.is_empty());
    assert!(result.confidence.abs() < f32::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_downstream_failures_are_sanitized() {
    let rag = failing_embedder_rag();

    let err = rag.query("What is asthma?", 3).await.unwrap_err();
    assert!(matches!(err, HealthRagError::RetrievalFailed));
    assert!(!err.to_string().contains("secret-host"));

    let err = rag.add_document(PNEUMONIA, Metadata::new()).await.unwrap_err();
    assert!(matches!(err, HealthRagError::IngestFailed));
    assert_eq!(err.to_string(), "Failed to add document. Please try again.");
}

#[tokio::test]
async fn test_stats() -> Result<()> {
    let rag = seeded_rag().await;
    let stats = rag.stats().await;
    assert_eq!(stats.status, RagStats::STATUS_ACTIVE);
    assert_eq!(stats.document_count, 10);
    assert_eq!(stats.collection_name.as_deref(), Some("healthcare_documents"));
    assert_eq!(stats.embedding_model.as_deref(), Some("keyword-stub"));

    let stats = failing_store_rag().stats().await;
    assert_eq!(stats, RagStats::error());
    Ok(())
}

#[tokio::test]
async fn test_routed_query_is_restricted_to_type() -> Result<()> {
    let rag = seeded_rag().await;
    rag.add_document(
        "Glossary: hypertension means persistently raised arterial blood pressure.",
        metadata(&[("type", "glossary")]),
    )
    .await?;

    let result = rag.query("What does hypertension mean?", 3).await?;

    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].metadata["type"], "glossary");
    Ok(())
}

#[tokio::test]
async fn test_routed_query_without_typed_documents_searches_everything() -> Result<()> {
    let rag = seeded_rag().await;

    // Routes to patient records, of which there are none
    let result = rag.query("Patient with hypertension", 3).await?;

    assert_eq!(result.sources.len(), 3);
    assert_eq!(result.sources[0].metadata["condition"], "hypertension");
    Ok(())
}

#[tokio::test]
async fn test_seed_is_idempotent() -> Result<()> {
    let rag = keyword_rag();

    assert_eq!(rag.seed_if_empty().await?, 10);
    assert_eq!(rag.seed_if_empty().await?, 0);
    assert_eq!(rag.seed().await?.len(), 10);
    assert_eq!(rag.document_count().await?, 10);
    Ok(())
}

#[tokio::test]
async fn test_ingest_text_tags_chunks() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let mut config = test_config();
    config.retrieval.chunk_chars = 80;
    let rag = keyword_rag_with_store(&config, store.clone());

    let text = "Patient A was diagnosed with asthma in 2019.\n\n\
                Patient B reports migraine episodes twice a month.\n\n\
                Patient C has stage 2 kidney disease.";
    let ids = rag
        .ingest_text("patient_notes.txt", text, metadata(&[("clinic", "north")]))
        .await?;
    assert_eq!(ids.len(), 3);

    let everything = vec![1.0_f32; 12];
    let docs = store.nearest(&everything, 10, None).await?;
    assert_eq!(docs.len(), 3);
    for doc in &docs {
        assert_eq!(doc.metadata["source_file"], "patient_notes.txt");
        assert_eq!(doc.metadata["type"], "patient_record");
        assert_eq!(doc.metadata["clinic"], "north");
        assert!(doc.metadata.contains_key("chunk"));
    }

    let result = rag.query("patient diagnosed with asthma", 1).await?;
    assert!(result.sources[0].content.contains("asthma"));
    Ok(())
}

#[tokio::test]
async fn test_ingest_rejects_empty_text() {
    let rag = keyword_rag();
    let err = rag
        .ingest_text("notes.txt", " \n\n ", Metadata::new())
        .await
        .unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_ingest_qa_table() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let rag = keyword_rag_with_store(&test_config(), store.clone());

    let csv = "question,answer,source,focus_area\n\
               What is asthma?,Asthma narrows the airways.,NIH,Asthma\n\
               ,,,\n\
               \"How is migraine treated?\",\"Rest, fluids, and pain relief.\",,Migraine\n";
    let base = metadata(&[("source", "upload"), ("clinic", "north")]);
    let ids = rag.ingest_table("medquad.csv", csv, base).await?;
    assert_eq!(ids.len(), 2);
    assert_eq!(rag.document_count().await?, 2);

    let result = rag.query("asthma", 1).await?;
    let top = &result.sources[0];
    assert_eq!(top.content, "Q: What is asthma?\nA: Asthma narrows the airways.");
    assert_eq!(top.metadata["source"], "NIH");
    assert_eq!(top.metadata["focus_area"], "Asthma");
    assert_eq!(top.metadata["clinic"], "north");
    assert_eq!(top.metadata["source_file"], "medquad.csv");
    assert_eq!(top.metadata["row"], "0");
    assert_eq!(top.metadata["type"], "document");

    let result = rag.query("migraine", 1).await?;
    let top = &result.sources[0];
    assert_eq!(
        top.content,
        "Q: How is migraine treated?\nA: Rest, fluids, and pain relief."
    );
    assert_eq!(top.metadata["source"], "medquad");
    Ok(())
}

#[tokio::test]
async fn test_ingest_plain_table() -> Result<()> {
    let rag = keyword_rag();
    let csv = "condition,severity\nasthma,moderate\ndiabetes,\n";
    let ids = rag
        .ingest_table("patient_table.csv", csv, Metadata::new())
        .await?;
    assert_eq!(ids.len(), 2);

    let result = rag.query("diabetes", 1).await?;
    assert_eq!(result.sources[0].content, "condition: diabetes");
    assert_eq!(result.sources[0].metadata["type"], "patient_record");
    Ok(())
}

#[tokio::test]
async fn test_ingest_table_without_rows_is_rejected() {
    let rag = keyword_rag();
    let err = rag
        .ingest_table("medquad.csv", "question,answer\n,\n", Metadata::new())
        .await
        .unwrap_err();
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_failed_persist_leaves_document_out() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(MemoryStore::open(dir.path(), "healthcare_documents").await?);
    let rag = keyword_rag_with_store(&test_config(), store);
    rag.add_document(SEED_DOCUMENTS[0].content, SEED_DOCUMENTS[0].metadata())
        .await?;

    std::fs::remove_dir_all(dir.path())?;

    let err = rag
        .add_document(PNEUMONIA, metadata(&[("condition", "pneumonia")]))
        .await
        .unwrap_err();
    assert!(matches!(err, HealthRagError::IngestFailed));
    assert_eq!(rag.document_count().await?, 1);
    let result = rag.query("pneumonia", 3).await?;
    assert!(result
        .sources
        .iter()
        .all(|s| s.metadata.get("condition").map(String::as_str) != Some("pneumonia")));
    Ok(())
}

#[tokio::test]
async fn test_clear() -> Result<()> {
    let rag = seeded_rag().await;
    rag.clear().await?;
    assert_eq!(rag.document_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_persists_across_restarts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = AppConfig::default();
    config.store.persist_dir = Some(dir.path().to_string_lossy().into_owned());

    let rag = HealthcareRag::from_config(&config).await?;
    rag.add_document(PNEUMONIA, Metadata::new()).await?;
    assert_eq!(rag.document_count().await?, 11);
    drop(rag);

    let reopened = HealthcareRag::from_config(&config).await?;
    assert_eq!(reopened.document_count().await?, 11);
    Ok(())
}

/// Serve a fake Wikipedia on a local port and return its base URL
async fn fake_wikipedia(titles: Vec<&'static str>) -> String {
    let app = Router::new()
        .route(
            "/w/api.php",
            get(move || {
                let titles = titles.clone();
                async move { Json(json!(["query", titles, [], []])) }
            }),
        )
        .route(
            "/api/rest_v1/page/summary/:title",
            get(|Path(title): Path<String>| async move {
                Json(json!({
                    "title": title,
                    "extract": "Hypertension is a long-term condition of raised blood pressure.",
                    "content_urls": {
                        "desktop": { "page": format!("https://en.wikipedia.org/wiki/{title}") }
                    }
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn internet_rag(endpoint: String) -> HealthcareRag {
    let mut config = test_config();
    config.internet.enabled = true;
    config.internet.endpoint = endpoint;
    keyword_rag_with_store(&config, Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_internet_fallback_on_empty_store() -> Result<()> {
    let rag = internet_rag(fake_wikipedia(vec!["Hypertension"]).await);

    let result = rag.query("What is hypertension?", 3).await?;

    assert_eq!(
        result.answer,
        "According to Wikipedia (Hypertension):\n\n\
         Hypertension is a long-term condition of raised blood pressure."
    );
    assert_eq!(result.sources.len(), 1);
    assert_eq!(
        result.sources[0].content,
        "https://en.wikipedia.org/wiki/Hypertension"
    );
    assert_eq!(result.sources[0].metadata["source"], "internet");
    assert!(result.sources[0].relevance_score.abs() < f32::EPSILON);
    assert!(result.confidence.abs() < f32::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_internet_fallback_without_hits() -> Result<()> {
    let rag = internet_rag(fake_wikipedia(Vec::new()).await);

    let result = rag.query("zzzz", 3).await?;

    assert_eq!(result.answer, NO_SUMMARY_ANSWER);
    assert_eq!(result.sources[0].content, "internet");
    Ok(())
}

#[tokio::test]
async fn test_internet_not_used_when_documents_match() -> Result<()> {
    // Unreachable endpoint: any lookup would produce the failure answer
    let rag = internet_rag("http://127.0.0.1:9".to_string());
    rag.seed().await?;

    let result = rag.query("What is asthma?", 3).await?;

    assert!(result.answer.starts_with(ANSWER_PREFIX));
    assert_eq!(result.sources[0].metadata["condition"], "asthma");
    Ok(())
}
