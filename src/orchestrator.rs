//! Phase sequencing for one run
//!
//! The ladder phase runs first so the match phase sees fresh player data.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::client::{ApiClient, Routing};
use crate::config::IngestConfig;
use crate::fetcher::{RateLimitedFetcher, RateLimiter, ReqwestTransport, RetryPolicy};
use crate::ingest::{
    IngestError, LadderIngestor, LadderReport, MatchIngestor, MatchLimits, MatchReport,
};
use crate::store::Store;

/// Which phases a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ladder then matches
    #[default]
    All,
    /// Ladder only
    LadderOnly,
    /// Matches only
    MatchesOnly,
}

impl Phase {
    /// Whether the ladder phase runs
    pub fn runs_ladder(&self) -> bool {
        matches!(self, Phase::All | Phase::LadderOnly)
    }

    /// Whether the match phase runs
    pub fn runs_matches(&self) -> bool {
        matches!(self, Phase::All | Phase::MatchesOnly)
    }
}

/// Reports of the phases that ran
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Ladder phase totals
    pub ladder: Option<LadderReport>,
    /// Match phase totals
    pub matches: Option<MatchReport>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ladder, &self.matches) {
            (None, None) => write!(f, "no phases ran"),
            (Some(ladder), None) => write!(f, "{ladder}"),
            (None, Some(matches)) => write!(f, "{matches}"),
            (Some(ladder), Some(matches)) => write!(f, "{ladder}\n{matches}"),
        }
    }
}

/// Runs the ingestion phases in order
pub struct Orchestrator {
    client: Arc<ApiClient>,
    store: Store,
    limits: MatchLimits,
    routing: Routing,
}

impl Orchestrator {
    /// Orchestrator over an existing client and store
    pub fn new(client: Arc<ApiClient>, store: Store, limits: MatchLimits) -> Self {
        Self {
            client,
            store,
            limits,
            routing: Routing::default(),
        }
    }

    /// Build the production stack from `config`
    ///
    /// # Errors
    /// Fails when the database cannot be reached
    pub async fn connect(config: &IngestConfig) -> Result<Self, IngestError> {
        let store = Store::connect(&config.database_url).await?;

        let transport = Arc::new(ReqwestTransport::new(config.api_key.clone()));
        let fetcher = Arc::new(RateLimitedFetcher::new(
            transport,
            Arc::new(RateLimiter::default()),
            RetryPolicy::new(config.max_retries),
        ));
        let client = ApiClient::new(fetcher).with_host_template(config.host_template.clone());

        Ok(Self::new(Arc::new(client), store, config.limits))
    }

    /// Replace the region → platform table used by the ladder phase
    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    /// Store the run writes to
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Execute `phase`
    ///
    /// # Errors
    /// Only phase-fatal errors are returned; per-item failures are in the report
    pub async fn run(&self, phase: Phase) -> Result<RunReport, IngestError> {
        let started = Instant::now();
        let mut report = RunReport::default();
        info!(?phase, "Ingestion run starting");

        if phase.runs_ladder() {
            let ingestor = LadderIngestor::new(Arc::clone(&self.client), self.store.clone())
                .with_routing(self.routing.clone());
            report.ladder = Some(ingestor.run().await);
        }

        if phase.runs_matches() {
            let ingestor =
                MatchIngestor::new(Arc::clone(&self.client), self.store.clone(), self.limits);
            report.matches = Some(ingestor.run().await?);
        }

        info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            ladder_entries = report.ladder.as_ref().map(|r| r.entries_upserted),
            matches_inserted = report.matches.as_ref().map(|r| r.inserted),
            matches_existing = report.matches.as_ref().map(|r| r.skipped_existing),
            matches_failed = report.matches.as_ref().map(|r| r.failed),
            "Ingestion run complete"
        );
        Ok(report)
    }
}
