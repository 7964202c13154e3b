//! # TFT Ingest Library
//!
//! Pulls ranked-ladder and match-history data from the Riot TFT API and loads it
//! into a relational store (PostgreSQL in production, SQLite for local runs).
//!
//! ## Features
//!
//! - **Dual-window rate limiting**: 20 requests per second and 100 requests per
//!   two minutes, shared by every call made through one fetcher
//! - **Bounded 429 handling**: honours `Retry-After`, backs off exponentially with
//!   jitter and gives up after a configurable number of retries
//! - **Platform/region routing**: ladder queries go to platform hosts, match
//!   queries to regional hosts
//! - **Idempotent loading**: ladder rows are upserted, matches are inserted once
//!   together with all their child rows in a single transaction
//!
//! ## Quick Start
//!
//! ```no_run
//! use tft_ingest::config::IngestConfig;
//! use tft_ingest::orchestrator::{Orchestrator, Phase};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::from_env()?;
//! let orchestrator = Orchestrator::connect(&config).await?;
//! let report = orchestrator.run(Phase::All).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - rate-limited GET-and-decode over a pluggable transport
//! - [`client`] - endpoint URL construction and routing tables
//! - [`store`] - relational persistence (schema, ladder upserts, match inserts)
//! - [`ingest`] - ladder and match ingestion steps with per-item outcomes
//! - [`orchestrator`] - sequences the phases of one run
//! - [`cli`] - command line surface
//! - [`config`] - explicit process configuration
//! - [`metrics`] - counters and histograms for requests and ingestion

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Command line surface
pub mod cli;

/// Upstream API client and routing tables
pub mod client;

/// Process configuration
pub mod config;

/// Rate-limited HTTP fetching
pub mod fetcher;

/// Ladder and match ingestion
pub mod ingest;

/// Observability metrics
pub mod metrics;

/// Phase sequencing for one run
pub mod orchestrator;

/// Relational persistence
pub mod store;

pub use client::{ApiClient, Region};
pub use fetcher::{FetchError, RateLimitedFetcher};

/// Competitive tier tracked by the ladder ingestion (the top three rungs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Highest tier
    #[serde(rename = "CHALLENGER")]
    Challenger,
    /// Second tier
    #[serde(rename = "GRANDMASTER")]
    Grandmaster,
    /// Third tier
    #[serde(rename = "MASTER")]
    Master,
}

impl Tier {
    /// All tracked tiers, highest first
    pub const ALL: [Tier; 3] = [Tier::Challenger, Tier::Grandmaster, Tier::Master];

    /// Upper-case label stored in the ladder table
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Challenger => "CHALLENGER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Master => "MASTER",
        }
    }

    /// Path segment of the league endpoint for this tier
    pub fn endpoint_segment(&self) -> &'static str {
        match self {
            Tier::Challenger => "challenger",
            Tier::Grandmaster => "grandmaster",
            Tier::Master => "master",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shorten a player key for log lines
pub fn short_key(player_key: &str) -> &str {
    match player_key.char_indices().nth(8) {
        Some((idx, _)) => &player_key[..idx],
        None => player_key,
    }
}
