//! CLI command handlers

use std::path::Path;

use tracing::info;

use crate::api::serve_api;
use crate::cli::output::*;
use crate::models::Metadata;
use crate::rag::HealthcareRag;
use crate::AppConfig;
use crate::HealthRagError;
use crate::Result;

/// Build the pipeline; `seed` controls first-run seeding of an empty store
pub async fn open_rag(config: &AppConfig, seed: bool) -> Result<HealthcareRag> {
    let mut config = config.clone();
    config.retrieval.seed_on_empty = config.retrieval.seed_on_empty && seed;
    HealthcareRag::from_config(&config).await
}

/// Handle serve command
pub async fn handle_serve_command(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    no_cors: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if no_cors {
        config.server.enable_cors = false;
    }
    serve_api(config).await
}

/// Handle query command
pub async fn handle_query_command(
    config: &AppConfig,
    question: &str,
    max_results: Option<usize>,
    json: bool,
) -> Result<()> {
    let rag = open_rag(config, true).await?;
    let max_results = max_results.unwrap_or_else(|| rag.default_max_results());
    let result = rag.query(question, max_results).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_query_result(question, &result);
    }
    Ok(())
}

/// Handle add command
pub async fn handle_add_command(
    config: &AppConfig,
    content: &str,
    metadata: Vec<(String, String)>,
) -> Result<()> {
    let rag = open_rag(config, true).await?;
    let id = rag
        .add_document(content, metadata.into_iter().collect())
        .await?;
    print_success(&format!("Document added: {id}"));
    Ok(())
}

/// Handle ingest command
pub async fn handle_ingest_command(
    config: &AppConfig,
    paths: &[impl AsRef<Path>],
    metadata: Vec<(String, String)>,
) -> Result<()> {
    let rag = open_rag(config, true).await?;
    let metadata: Metadata = metadata.into_iter().collect();

    let mut total = 0;
    for path in paths {
        let path = path.as_ref();
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HealthRagError::InvalidInput(format!("Not a file: {}", path.display()))
            })?;
        let text = tokio::fs::read_to_string(path).await?;

        let (ids, unit) = if is_csv(path) {
            let ids = rag.ingest_table(&source_name, &text, metadata.clone()).await?;
            (ids, "rows")
        } else {
            let ids = rag.ingest_text(&source_name, &text, metadata.clone()).await?;
            (ids, "chunks")
        };
        info!("Inserted {} {} from {}", ids.len(), unit, path.display());
        print_info(&format!("{}: {} {unit}", path.display(), ids.len()));
        total += ids.len();
    }

    print_success(&format!(
        "Ingested {total} documents from {} files",
        paths.len()
    ));
    Ok(())
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Handle seed command
pub async fn handle_seed_command(config: &AppConfig, force: bool) -> Result<()> {
    let rag = open_rag(config, false).await?;
    let added = if force {
        rag.seed().await?.len()
    } else {
        rag.seed_if_empty().await?
    };

    if added == 0 {
        print_info("Knowledge base is not empty; use --force to add the samples anyway");
    } else {
        print_success(&format!("Added {added} sample documents"));
    }
    Ok(())
}

/// Handle stats command
pub async fn handle_stats_command(config: &AppConfig, json: bool) -> Result<()> {
    let rag = open_rag(config, false).await?;
    let stats = rag.stats().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

/// Handle clear command
pub async fn handle_clear_command(config: &AppConfig, force: bool) -> Result<()> {
    if !force {
        print_warning(&format!(
            "This removes every document from '{}'. Re-run with --force to confirm.",
            config.collection_name()
        ));
        return Ok(());
    }

    let rag = open_rag(config, false).await?;
    let before = rag.document_count().await?;
    rag.clear().await?;
    print_success(&format!("Removed {before} documents"));
    Ok(())
}

/// Handle config command
pub fn handle_config_command(config: &AppConfig) {
    print_config(config);
}
