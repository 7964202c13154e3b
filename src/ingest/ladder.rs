//! Ladder ingestion
//!
//! Walks every tier × region × platform, fetches the ladder page and upserts
//! its entries in one transaction per page.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ItemOutcome, LadderReport};
use crate::client::{ApiClient, Region, Routing};
use crate::metrics::record_ingest_outcome;
use crate::store::{LadderRow, Store};
use crate::Tier;

/// Fetches top-tier ladders and upserts them keyed by (player key, region)
pub struct LadderIngestor {
    client: Arc<ApiClient>,
    store: Store,
    routing: Routing,
    tiers: Vec<Tier>,
}

impl LadderIngestor {
    /// Ingestor over every tier and the default routing table
    pub fn new(client: Arc<ApiClient>, store: Store) -> Self {
        Self {
            client,
            store,
            routing: Routing::default(),
            tiers: Tier::ALL.to_vec(),
        }
    }

    /// Replace the region → platform table
    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    /// Restrict the tiers walked
    pub fn with_tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Run the ladder phase
    ///
    /// Fetch and commit failures are logged and counted; the walk always
    /// reaches every platform.
    pub async fn run(&self) -> LadderReport {
        let mut report = LadderReport::default();
        info!(
            tiers = self.tiers.len(),
            platforms = self.routing.platform_count(),
            "Starting ladder ingestion"
        );

        for tier in &self.tiers {
            for entry in self.routing.entries() {
                for platform in &entry.platforms {
                    self.ingest_platform(*tier, entry.region, platform, &mut report)
                        .await;
                }
            }
        }

        info!(%report, "Ladder ingestion finished");
        report
    }

    async fn ingest_platform(
        &self,
        tier: Tier,
        region: Region,
        platform: &str,
        report: &mut LadderReport,
    ) {
        let list = match self.client.get_ladder(tier, platform).await {
            Ok(list) => list,
            Err(e) => {
                warn!(%tier, platform, error = %e, "Failed to fetch ladder");
                report.fetches_failed += 1;
                record_ingest_outcome("ladder", "fetch_failed");
                return;
            }
        };

        let rows: Vec<LadderRow> = list
            .entries
            .iter()
            .map(|entry| LadderRow::from_entry(entry, tier, region))
            .collect();
        let updated_at = chrono::Utc::now().timestamp_millis();

        let outcome = match self.store.upsert_ladder_batch(&rows, updated_at).await {
            Ok(_) => {
                debug!(%tier, platform, %region, entries = rows.len(), "Ladder batch stored");
                ItemOutcome::Stored
            }
            Err(e) => {
                warn!(%tier, platform, error = %e, "Failed to commit ladder batch");
                ItemOutcome::failed(e)
            }
        };

        record_ingest_outcome("ladder", outcome.label());
        report.record_batch(&outcome, rows.len() as u64);
    }
}
