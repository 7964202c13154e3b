//! Table definitions
//!
//! Timestamps are stored as BIGINT unix epoch milliseconds. Child tables cascade
//! on delete from their parent.

use super::Dialect;

const LADDER_ENTRIES: &str = "CREATE TABLE IF NOT EXISTS ladder_entries (
    puuid TEXT NOT NULL,
    region TEXT NOT NULL,
    summoner_id TEXT,
    tier TEXT NOT NULL,
    rank TEXT NOT NULL,
    league_points BIGINT NOT NULL,
    wins BIGINT NOT NULL,
    losses BIGINT NOT NULL,
    updated_at BIGINT NOT NULL,
    PRIMARY KEY (puuid, region)
)";

const LADDER_UPDATED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_ladder_entries_updated_at ON ladder_entries (updated_at)";

const MATCHES: &str = "CREATE TABLE IF NOT EXISTS matches (
    match_id TEXT PRIMARY KEY,
    data_version TEXT NOT NULL,
    game_datetime BIGINT,
    game_length DOUBLE PRECISION,
    game_version TEXT NOT NULL,
    queue_id BIGINT,
    tft_game_type TEXT NOT NULL,
    tft_set_number BIGINT,
    tft_set_core_name TEXT NOT NULL,
    region TEXT NOT NULL
)";

const MATCH_PARTICIPANTS: &str = "CREATE TABLE IF NOT EXISTS match_participants (
    id {id},
    match_id TEXT NOT NULL REFERENCES matches (match_id) ON DELETE CASCADE,
    puuid TEXT NOT NULL,
    placement BIGINT,
    level BIGINT,
    gold_left BIGINT,
    last_round BIGINT,
    players_eliminated BIGINT,
    time_eliminated DOUBLE PRECISION,
    total_damage_to_players BIGINT
)";

const PARTICIPANTS_MATCH_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_match_participants_match_id ON match_participants (match_id)";

const PARTICIPANT_AUGMENTS: &str = "CREATE TABLE IF NOT EXISTS participant_augments (
    id {id},
    participant_id BIGINT NOT NULL REFERENCES match_participants (id) ON DELETE CASCADE,
    augment_id TEXT NOT NULL,
    pick_order BIGINT NOT NULL
)";

const PARTICIPANT_TRAITS: &str = "CREATE TABLE IF NOT EXISTS participant_traits (
    id {id},
    participant_id BIGINT NOT NULL REFERENCES match_participants (id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    num_units BIGINT,
    style BIGINT,
    tier_current BIGINT,
    tier_total BIGINT
)";

const PARTICIPANT_UNITS: &str = "CREATE TABLE IF NOT EXISTS participant_units (
    id {id},
    participant_id BIGINT NOT NULL REFERENCES match_participants (id) ON DELETE CASCADE,
    character_id TEXT NOT NULL,
    tier BIGINT,
    rarity BIGINT
)";

const UNIT_ITEMS: &str = "CREATE TABLE IF NOT EXISTS unit_items (
    id {id},
    unit_id BIGINT NOT NULL REFERENCES participant_units (id) ON DELETE CASCADE,
    item_id BIGINT,
    item_name TEXT NOT NULL
)";

/// Surrogate key column definition for `dialect`
fn id_column(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => "BIGSERIAL PRIMARY KEY",
        Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
    }
}

/// DDL statements in dependency order
pub fn statements(dialect: Dialect) -> Vec<String> {
    [
        LADDER_ENTRIES,
        LADDER_UPDATED_INDEX,
        MATCHES,
        MATCH_PARTICIPANTS,
        PARTICIPANTS_MATCH_INDEX,
        PARTICIPANT_AUGMENTS,
        PARTICIPANT_TRAITS,
        PARTICIPANT_UNITS,
        UNIT_ITEMS,
    ]
    .iter()
    .map(|ddl| ddl.replace("{id}", id_column(dialect)))
    .collect()
}
