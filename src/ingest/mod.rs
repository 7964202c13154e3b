//! Ladder and match ingestion
//!
//! Ingestors turn per-item errors into explicit [`ItemOutcome`] values and fold
//! them into a phase report. Only errors that stop a whole phase (for example
//! failing to select players) escape as [`IngestError`].

use serde::Serialize;
use std::fmt;

pub mod ladder;
pub mod matches;
pub mod normalize;

pub use crate::config::MatchLimits;
pub use ladder::LadderIngestor;
pub use matches::MatchIngestor;
pub use normalize::normalize_match;

use crate::store::StoreError;

/// Phase-level ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Persistence failure that stops the phase
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of ingesting one item (a ladder batch or a match)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Written to the store
    Stored,
    /// Already present; nothing written
    AlreadyPresent,
    /// Fetch or write failed; nothing written
    Failed {
        /// Human-readable cause
        reason: String,
    },
}

impl ItemOutcome {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Stored => "stored",
            ItemOutcome::AlreadyPresent => "existing",
            ItemOutcome::Failed { .. } => "failed",
        }
    }

    /// Failure with the given cause
    pub fn failed(reason: impl fmt::Display) -> Self {
        ItemOutcome::Failed {
            reason: reason.to_string(),
        }
    }
}

/// Ladder phase totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LadderReport {
    /// Platform pages fetched and committed
    pub batches_committed: usize,
    /// Platform pages fetched but not committed
    pub batches_failed: usize,
    /// Platform pages that could not be fetched
    pub fetches_failed: usize,
    /// Ladder rows written
    pub entries_upserted: u64,
}

impl LadderReport {
    /// Fold one batch outcome into the totals
    pub fn record_batch(&mut self, outcome: &ItemOutcome, entries: u64) {
        match outcome {
            ItemOutcome::Stored | ItemOutcome::AlreadyPresent => {
                self.batches_committed += 1;
                self.entries_upserted += entries;
            }
            ItemOutcome::Failed { .. } => self.batches_failed += 1,
        }
    }
}

impl fmt::Display for LadderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ladder: {} entries upserted in {} batches ({} batches failed, {} fetches failed)",
            self.entries_upserted, self.batches_committed, self.batches_failed, self.fetches_failed
        )
    }
}

/// Match phase totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Players whose match ids were fetched
    pub players_processed: usize,
    /// Players skipped because their match ids could not be fetched
    pub players_skipped: usize,
    /// Matches written
    pub inserted: usize,
    /// Matches already stored
    pub skipped_existing: usize,
    /// Matches that failed to fetch or write
    pub failed: usize,
}

impl MatchReport {
    /// Fold one match outcome into the totals
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Stored => self.inserted += 1,
            ItemOutcome::AlreadyPresent => self.skipped_existing += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matches: {} inserted, {} already stored, {} failed ({} players processed, {} skipped)",
            self.inserted,
            self.skipped_existing,
            self.failed,
            self.players_processed,
            self.players_skipped
        )
    }
}
