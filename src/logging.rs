//! Logging configuration for HealthRAG

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::HealthRagError;
use crate::Result;

/// Initialize logging with configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging_with_config(config: Option<&LoggingConfig>) -> Result<Option<WorkerGuard>> {
    // Set up environment filter - use config if available, otherwise RUST_LOG or default
    let env_filter = if let Some(config) = config {
        EnvFilter::new(format!("{},healthrag={}", config.level, config.level))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,healthrag=debug"))
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match config {
        Some(config) if config.file_output => {
            let logs_dir = Path::new(&config.log_dir);
            if !logs_dir.exists() {
                std::fs::create_dir_all(logs_dir)?;
            }

            let file_appender = tracing_appender::rolling::daily(logs_dir, "healthrag.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(non_blocking)
                .with_ansi(false); // No colors in file

            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| HealthRagError::ConfigError(format!("Failed to initialize logging: {e}")))?;

    let level = config.map_or("info", |c| c.level.as_str());
    tracing::info!("Logging initialized with level: {}", level);
    if let Some(config) = config.filter(|c| c.file_output) {
        tracing::info!(
            "Log files will be saved to: {}/healthrag.log.YYYY-MM-DD",
            config.log_dir
        );
    }

    Ok(guard)
}

/// Initialize simple logging for testing
pub fn init_simple_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}
