//! Folio terminal client - composition root.
//!
//! 1. Resolve CLI args and load configuration from TOML
//! 2. Initialize tracing (stderr, so the chat on stdout stays clean)
//! 3. Load the portfolio catalog
//! 4. Build the HTTP transport and the dialogue orchestrator
//! 5. Run the interactive loop

mod cli;
mod repl;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use folio_chat::{DialogueOrchestrator, HttpTransport};
use folio_core::config::FolioConfig;
use folio_core::Portfolio;

use cli::CliArgs;

fn load_portfolio(path: Option<&str>) -> Result<Portfolio, folio_core::FolioError> {
    match path {
        Some(p) => {
            let portfolio = Portfolio::load(Path::new(p))?;
            tracing::info!(path = p, "Portfolio loaded");
            Ok(portfolio)
        }
        None => {
            tracing::info!("No portfolio path configured, using built-in sample");
            Ok(Portfolio::sample())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FolioConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins over flag and config.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if let Some(url) = args.resolve_api_url() {
        tracing::info!(url = %url, "Reasoning service URL overridden");
        config.transport.base_url = url;
    }

    // Portfolio.
    let portfolio = load_portfolio(config.portfolio.path.as_deref())?;

    // Transport + orchestrator.
    let transport = HttpTransport::new(&config.transport)?;
    tracing::info!(endpoint = %transport.endpoint(), "HTTP transport ready");

    let orchestrator =
        DialogueOrchestrator::new(transport, Arc::new(portfolio), config.chat.clone());

    repl::run(orchestrator).await?;

    tracing::info!("Folio shut down");
    Ok(())
}
