//! Ingestion command

use clap::Parser;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::info;

use super::CliError;
use crate::config::{IngestConfig, MatchLimits, DEFAULT_MATCHES_PER_PLAYER, DEFAULT_MAX_PLAYERS};
use crate::metrics;
use crate::orchestrator::{Orchestrator, Phase, RunReport};

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary lines
    Human,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {s}. Valid options: human, json")),
        }
    }
}

/// TFT ladder and match ingestion CLI
#[derive(Parser, Debug)]
#[command(name = "tft-ingest")]
#[command(about = "Ingest ranked ladder and match history into a relational store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Only run the ladder phase
    #[arg(long, conflicts_with = "matches_only")]
    pub ladder_only: bool,

    /// Only run the match phase
    #[arg(long)]
    pub matches_only: bool,

    /// Maximum number of players whose matches are fetched
    #[arg(long, default_value_t = DEFAULT_MAX_PLAYERS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_players: u32,

    /// Number of recent match ids fetched per player
    #[arg(long, default_value_t = DEFAULT_MATCHES_PER_PLAYER, value_parser = clap::value_parser!(u32).range(1..=200))]
    pub matches_per_player: u32,

    /// Maximum number of retries for rate-limited requests (default: 5, range: 1-20)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Create tables and indexes before running
    #[arg(long, default_value_t = false)]
    pub init_schema: bool,

    /// Expose Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Output format (json or human)
    #[arg(long, default_value = "human")]
    pub output_format: OutputFormat,
}

impl Cli {
    /// Phase selected by the flags
    pub fn phase(&self) -> Phase {
        match (self.ladder_only, self.matches_only) {
            (true, _) => Phase::LadderOnly,
            (false, true) => Phase::MatchesOnly,
            (false, false) => Phase::All,
        }
    }

    /// Match phase limits selected by the flags
    pub fn limits(&self) -> MatchLimits {
        MatchLimits {
            max_players: self.max_players,
            matches_per_player: self.matches_per_player,
        }
    }

    /// Apply the flags on top of an environment-derived configuration
    pub fn apply(&self, config: IngestConfig) -> IngestConfig {
        config
            .with_limits(self.limits())
            .with_max_retries(self.max_retries)
    }

    /// Run the ingestion described by the flags
    pub async fn execute(&self) -> Result<RunReport, CliError> {
        if let Some(addr) = self.metrics_addr {
            metrics::init_metrics(addr).map_err(CliError::Metrics)?;
        }

        let config = self.apply(IngestConfig::from_env()?);
        info!(?config, phase = ?self.phase(), "Configuration loaded");

        let orchestrator = Orchestrator::connect(&config).await?;
        if self.init_schema {
            orchestrator.store().init_schema().await?;
        }

        let report = orchestrator.run(self.phase()).await;
        orchestrator.store().close().await;
        Ok(report?)
    }

    /// Render a finished run in the selected format
    pub fn render(&self, report: &RunReport) -> Result<String, CliError> {
        match self.output_format {
            OutputFormat::Human => Ok(report.to_string()),
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| CliError::InvalidArgument(format!("Failed to render report: {e}"))),
        }
    }
}
