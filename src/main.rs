use clap::Parser;
use healthrag::cli::handlers::*;
use healthrag::cli::output::print_error;
use healthrag::cli::Cli;
use healthrag::cli::Commands;
use healthrag::config::AppConfig;
use healthrag::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(Some(path.as_path()))?,
        None => AppConfig::load()?,
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    let _guard = healthrag::logging::init_logging_with_config(Some(&logging))?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => handle_serve_command(config, host, port, no_cors).await,
        Commands::Query {
            question,
            max_results,
            json,
        } => handle_query_command(&config, &question, max_results, json).await,
        Commands::Add { content, metadata } => {
            handle_add_command(&config, &content, metadata).await
        }
        Commands::Ingest { paths, metadata } => {
            handle_ingest_command(&config, &paths, metadata).await
        }
        Commands::Seed { force } => handle_seed_command(&config, force).await,
        Commands::Stats { json } => handle_stats_command(&config, json).await,
        Commands::Clear { force } => handle_clear_command(&config, force).await,
        Commands::Config => {
            handle_config_command(&config);
            Ok(())
        }
    }
}
