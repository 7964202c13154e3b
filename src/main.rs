//! Main entry point for the tft-ingest CLI

use clap::Parser;
use tft_ingest::cli::Cli;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tft_ingest=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: &Cli) -> anyhow::Result<String> {
    let report = cli.execute().await?;
    Ok(cli.render(&report)?)
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            error!("Ingestion failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
