//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "healthrag")]
#[command(about = "Healthcare RAG service and knowledge base tool")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host address to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS headers
        #[arg(long)]
        no_cors: bool,
    },
    /// Ask a question against the knowledge base
    Query {
        /// The question to answer
        question: String,
        /// Number of documents to retrieve (default: retrieval.default_max_results)
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a single document
    Add {
        /// Document text
        content: String,
        /// Metadata entries as key=value (repeatable)
        #[arg(short, long = "meta", value_parser = parse_key_val)]
        metadata: Vec<(String, String)>,
    },
    /// Ingest files: text is split into chunks, `.csv` tables give one document per row
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Metadata entries added to every document, as key=value (repeatable)
        #[arg(short, long = "meta", value_parser = parse_key_val)]
        metadata: Vec<(String, String)>,
    },
    /// Add the built-in sample documents
    Seed {
        /// Add them even when the knowledge base is not empty
        #[arg(short, long)]
        force: bool,
    },
    /// Show knowledge base statistics
    Stats {
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every document from the collection
    Clear {
        /// Required confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Show current configuration
    Config,
}

/// Parse a `key=value` argument
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
