//! Ladder table access

use tracing::debug;

use super::{Store, StoreResult};
use crate::client::{LeagueEntryDto, Region};
use crate::Tier;

const UPSERT_LADDER_ENTRY: &str = "INSERT INTO ladder_entries
    (puuid, region, summoner_id, tier, rank, league_points, wins, losses, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (puuid, region) DO UPDATE SET
        tier = excluded.tier,
        rank = excluded.rank,
        league_points = excluded.league_points,
        wins = excluded.wins,
        losses = excluded.losses,
        updated_at = excluded.updated_at";

const SELECT_RECENT_PLAYERS: &str =
    "SELECT puuid, region FROM ladder_entries ORDER BY updated_at DESC, puuid ASC LIMIT $1";

const SELECT_LADDER_ENTRY: &str = "SELECT puuid, region, summoner_id, tier, rank,
    league_points, wins, losses, updated_at
    FROM ladder_entries WHERE puuid = $1 AND region = $2";

/// One ladder standing ready to be upserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderRow {
    /// Player key
    pub player_key: String,
    /// Legacy secondary identifier
    pub summoner_id: Option<String>,
    /// Tier of the page the entry came from
    pub tier: Tier,
    /// Sub-rank label
    pub rank: String,
    /// Ranked points
    pub league_points: i64,
    /// Wins
    pub wins: i64,
    /// Losses
    pub losses: i64,
    /// Region tag
    pub region: Region,
}

impl LadderRow {
    /// Row for an entry fetched from `tier` on a platform of `region`
    pub fn from_entry(entry: &LeagueEntryDto, tier: Tier, region: Region) -> Self {
        Self {
            player_key: entry.puuid.clone(),
            summoner_id: entry.summoner_id.clone(),
            tier,
            rank: entry.rank.clone(),
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
            region,
        }
    }
}

/// Stored ladder row as read back from the database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredLadderEntry {
    /// Player key
    pub puuid: String,
    /// Region tag
    pub region: String,
    /// Legacy secondary identifier
    pub summoner_id: Option<String>,
    /// Tier label
    pub tier: String,
    /// Sub-rank label
    pub rank: String,
    /// Ranked points
    pub league_points: i64,
    /// Wins
    pub wins: i64,
    /// Losses
    pub losses: i64,
    /// Last update, epoch milliseconds
    pub updated_at: i64,
}

/// Player selected for match discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    /// Player key
    pub player_key: String,
    /// Region tag as stored
    pub region: String,
}

impl Store {
    /// Upsert a batch of ladder rows in one transaction
    ///
    /// New (player key, region) pairs are inserted; existing ones get their
    /// tier, rank, points, wins, losses and timestamp overwritten. Identity
    /// columns are never changed. Returns the number of rows written.
    pub async fn upsert_ladder_batch(&self, rows: &[LadderRow], updated_at_ms: i64) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;

        for row in rows {
            let result = sqlx::query(UPSERT_LADDER_ENTRY)
                .bind(row.player_key.as_str())
                .bind(row.region.as_str())
                .bind(row.summoner_id.as_deref())
                .bind(row.tier.as_str())
                .bind(row.rank.as_str())
                .bind(row.league_points)
                .bind(row.wins)
                .bind(row.losses)
                .bind(updated_at_ms)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(done) => written += done.rows_affected(),
                Err(e) => {
                    tx.rollback().await?;
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;
        debug!(rows = rows.len(), written, "ladder batch committed");
        Ok(written)
    }

    /// Up to `limit` players, most recently updated first
    pub async fn recent_players(&self, limit: u32) -> StoreResult<Vec<PlayerRef>> {
        let rows: Vec<(String, String)> = sqlx::query_as(SELECT_RECENT_PLAYERS)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(player_key, region)| PlayerRef { player_key, region })
            .collect())
    }

    /// Stored row for one (player key, region) pair
    pub async fn ladder_entry(
        &self,
        player_key: &str,
        region: Region,
    ) -> StoreResult<Option<StoredLadderEntry>> {
        let entry = sqlx::query_as::<_, StoredLadderEntry>(SELECT_LADDER_ENTRY)
            .bind(player_key)
            .bind(region.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }
}
