//! Match hierarchy access
//!
//! A match and all of its child rows (participants, augments, traits, units,
//! items) are written in one transaction. Either everything lands or nothing
//! does.

use sqlx::AnyConnection;
use tracing::{debug, warn};

use super::{Store, StoreResult};

const MATCH_EXISTS: &str = "SELECT COUNT(*) FROM matches WHERE match_id = $1";

const INSERT_MATCH: &str = "INSERT INTO matches
    (match_id, data_version, game_datetime, game_length, game_version, queue_id,
     tft_game_type, tft_set_number, tft_set_core_name, region)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (match_id) DO NOTHING";

const INSERT_PARTICIPANT: &str = "INSERT INTO match_participants
    (match_id, puuid, placement, level, gold_left, last_round, players_eliminated,
     time_eliminated, total_damage_to_players)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id";

const INSERT_AUGMENT: &str =
    "INSERT INTO participant_augments (participant_id, augment_id, pick_order) VALUES ($1, $2, $3)";

const INSERT_TRAIT: &str = "INSERT INTO participant_traits
    (participant_id, name, num_units, style, tier_current, tier_total)
    VALUES ($1, $2, $3, $4, $5, $6)";

const INSERT_UNIT: &str = "INSERT INTO participant_units
    (participant_id, character_id, tier, rarity)
    VALUES ($1, $2, $3, $4)
    RETURNING id";

const INSERT_ITEM: &str =
    "INSERT INTO unit_items (unit_id, item_id, item_name) VALUES ($1, $2, $3)";

/// Normalized match ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Globally unique match id
    pub match_id: String,
    /// Payload version tag
    pub data_version: String,
    /// Start time, epoch milliseconds
    pub game_datetime: Option<i64>,
    /// Duration in seconds
    pub game_length: Option<f64>,
    /// Game client version
    pub game_version: String,
    /// Queue identifier
    pub queue_id: Option<i64>,
    /// Game type tag
    pub tft_game_type: String,
    /// Set number
    pub tft_set_number: Option<i64>,
    /// Set core name
    pub tft_set_core_name: String,
    /// Region the match was fetched from
    pub region: String,
    /// Lobby participants
    pub participants: Vec<ParticipantRow>,
}

/// Participant with its child rows
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRow {
    /// Player key
    pub puuid: String,
    /// Final placement
    pub placement: Option<i64>,
    /// Final level
    pub level: Option<i64>,
    /// Gold left
    pub gold_left: Option<i64>,
    /// Last round reached
    pub last_round: Option<i64>,
    /// Players eliminated
    pub players_eliminated: Option<i64>,
    /// Elimination time in seconds
    pub time_eliminated: Option<f64>,
    /// Damage dealt to players
    pub total_damage_to_players: Option<i64>,
    /// Augments in pick order
    pub augments: Vec<AugmentRow>,
    /// Active traits
    pub traits: Vec<TraitRow>,
    /// Final board units
    pub units: Vec<UnitRow>,
}

/// Augment pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentRow {
    /// Augment id
    pub augment_id: String,
    /// 1-based pick order
    pub pick_order: i64,
}

/// Trait activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitRow {
    /// Trait name
    pub name: String,
    /// Contributing units
    pub num_units: Option<i64>,
    /// Style indicator
    pub style: Option<i64>,
    /// Current tier
    pub tier_current: Option<i64>,
    /// Total tiers
    pub tier_total: Option<i64>,
}

/// Unit with its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRow {
    /// Character id
    pub character_id: String,
    /// Star tier
    pub tier: Option<i64>,
    /// Rarity cost
    pub rarity: Option<i64>,
    /// Items in slot order
    pub items: Vec<ItemRow>,
}

/// Item held by a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Numeric id; `None` when the id list was shorter than the name list
    pub item_id: Option<i64>,
    /// Display name
    pub item_name: String,
}

/// Result of an insert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Match and children written
    Inserted,
    /// A match with the same id already exists; nothing written
    AlreadyPresent,
}

impl Store {
    /// Whether a match with `match_id` is stored
    pub async fn match_exists(&self, match_id: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(MATCH_EXISTS)
            .bind(match_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Insert a match and all of its children atomically
    ///
    /// A conflicting match id rolls the transaction back and yields
    /// [`InsertOutcome::AlreadyPresent`]. Any failure rolls back every row
    /// written so far.
    pub async fn insert_match(&self, record: &MatchRecord) -> StoreResult<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        match write_match(&mut tx, record).await {
            Ok(true) => {
                tx.commit().await?;
                debug!(match_id = %record.match_id, participants = record.participants.len(), "match committed");
                Ok(InsertOutcome::Inserted)
            }
            Ok(false) => {
                tx.rollback().await?;
                Ok(InsertOutcome::AlreadyPresent)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(match_id = %record.match_id, error = %rollback_err, "rollback failed");
                }
                Err(e.into())
            }
        }
    }
}

/// Write the full hierarchy; `Ok(false)` when the match row already existed
async fn write_match(conn: &mut AnyConnection, record: &MatchRecord) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query(INSERT_MATCH)
        .bind(record.match_id.as_str())
        .bind(record.data_version.as_str())
        .bind(record.game_datetime)
        .bind(record.game_length)
        .bind(record.game_version.as_str())
        .bind(record.queue_id)
        .bind(record.tft_game_type.as_str())
        .bind(record.tft_set_number)
        .bind(record.tft_set_core_name.as_str())
        .bind(record.region.as_str())
        .execute(&mut *conn)
        .await?;

    if inserted.rows_affected() == 0 {
        return Ok(false);
    }

    for participant in &record.participants {
        let participant_id: i64 = sqlx::query_scalar(INSERT_PARTICIPANT)
            .bind(record.match_id.as_str())
            .bind(participant.puuid.as_str())
            .bind(participant.placement)
            .bind(participant.level)
            .bind(participant.gold_left)
            .bind(participant.last_round)
            .bind(participant.players_eliminated)
            .bind(participant.time_eliminated)
            .bind(participant.total_damage_to_players)
            .fetch_one(&mut *conn)
            .await?;

        for augment in &participant.augments {
            sqlx::query(INSERT_AUGMENT)
                .bind(participant_id)
                .bind(augment.augment_id.as_str())
                .bind(augment.pick_order)
                .execute(&mut *conn)
                .await?;
        }

        for t in &participant.traits {
            sqlx::query(INSERT_TRAIT)
                .bind(participant_id)
                .bind(t.name.as_str())
                .bind(t.num_units)
                .bind(t.style)
                .bind(t.tier_current)
                .bind(t.tier_total)
                .execute(&mut *conn)
                .await?;
        }

        for unit in &participant.units {
            let unit_id: i64 = sqlx::query_scalar(INSERT_UNIT)
                .bind(participant_id)
                .bind(unit.character_id.as_str())
                .bind(unit.tier)
                .bind(unit.rarity)
                .fetch_one(&mut *conn)
                .await?;

            for item in &unit.items {
                sqlx::query(INSERT_ITEM)
                    .bind(unit_id)
                    .bind(item.item_id)
                    .bind(item.item_name.as_str())
                    .execute(&mut *conn)
                    .await?;
            }
        }
    }

    Ok(true)
}
