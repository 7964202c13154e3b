//! Match ingestion
//!
//! Discovers recent match ids for the most recently updated ladder players and
//! stores every match not already present.

use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::normalize::normalize_match;
use super::{IngestError, ItemOutcome, MatchLimits, MatchReport};
use crate::client::{ApiClient, Region};
use crate::metrics::record_ingest_outcome;
use crate::short_key;
use crate::store::{InsertOutcome, PlayerRef, Store};

/// Fetches and stores match histories for known players
pub struct MatchIngestor {
    client: Arc<ApiClient>,
    store: Store,
    limits: MatchLimits,
}

impl MatchIngestor {
    /// Create an ingestor with the given limits
    pub fn new(client: Arc<ApiClient>, store: Store, limits: MatchLimits) -> Self {
        Self {
            client,
            store,
            limits,
        }
    }

    /// Limits in effect
    pub fn limits(&self) -> MatchLimits {
        self.limits
    }

    /// Run the match phase
    ///
    /// # Errors
    /// Returns [`IngestError::Store`] only when the player selection fails.
    /// Per-player and per-match failures are counted in the report.
    pub async fn run(&self) -> Result<MatchReport, IngestError> {
        let players = self.store.recent_players(self.limits.max_players).await?;
        info!(
            players = players.len(),
            matches_per_player = self.limits.matches_per_player,
            "Starting match ingestion"
        );

        let mut report = MatchReport::default();
        for player in &players {
            self.ingest_player(player, &mut report).await;
        }

        info!(%report, "Match ingestion finished");
        Ok(report)
    }

    async fn ingest_player(&self, player: &PlayerRef, report: &mut MatchReport) {
        let key = short_key(&player.player_key);

        let region = match Region::from_str(&player.region) {
            Ok(region) => region,
            Err(e) => {
                warn!(player = key, error = %e, "Skipping player with unknown region");
                report.players_skipped += 1;
                return;
            }
        };

        let match_ids = match self
            .client
            .get_match_ids(region, &player.player_key, self.limits.matches_per_player, 0)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(player = key, %region, error = %e, "Failed to fetch match ids");
                report.players_skipped += 1;
                return;
            }
        };

        report.players_processed += 1;
        debug!(player = key, %region, matches = match_ids.len(), "Fetched match ids");

        for match_id in &match_ids {
            let outcome = self.ingest_match(region, match_id).await;
            record_ingest_outcome("matches", outcome.label());
            report.record(&outcome);
        }
    }

    /// Store one match if it is not already present
    pub async fn ingest_match(&self, region: Region, match_id: &str) -> ItemOutcome {
        match self.store.match_exists(match_id).await {
            Ok(true) => return ItemOutcome::AlreadyPresent,
            Ok(false) => {}
            Err(e) => {
                warn!(match_id, error = %e, "Failed to check match existence");
                return ItemOutcome::failed(e);
            }
        }

        let dto = match self.client.get_match(region, match_id).await {
            Ok(dto) => dto,
            Err(e) => {
                warn!(match_id, error = %e, "Failed to fetch match");
                return ItemOutcome::failed(e);
            }
        };

        let record = normalize_match(&dto, region);
        match self.store.insert_match(&record).await {
            Ok(InsertOutcome::Inserted) => {
                debug!(match_id, participants = record.participants.len(), "Match stored");
                ItemOutcome::Stored
            }
            Ok(InsertOutcome::AlreadyPresent) => ItemOutcome::AlreadyPresent,
            Err(e) => {
                warn!(match_id, error = %e, "Failed to store match");
                ItemOutcome::failed(e)
            }
        }
    }
}
