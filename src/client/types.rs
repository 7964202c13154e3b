//! Upstream payload types
//!
//! Only the fields the pipeline stores are modelled. Missing fields fall back to
//! defaults: empty strings, `None` for numbers and empty child lists.

use serde::{Deserialize, Serialize};

/// Ladder page returned by the league endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeagueList {
    /// Tier label reported by the page
    pub tier: Option<String>,
    /// League identifier
    pub league_id: Option<String>,
    /// Queue type
    pub queue: Option<String>,
    /// Ladder entries
    pub entries: Vec<LeagueEntryDto>,
}

/// One player's standing on a ladder page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    /// Stable player key
    pub puuid: String,
    /// Legacy secondary identifier
    #[serde(default)]
    pub summoner_id: Option<String>,
    /// Sub-rank label ("I" for the apex tiers)
    #[serde(default)]
    pub rank: String,
    /// Ranked points
    #[serde(default)]
    pub league_points: i64,
    /// Wins this season
    #[serde(default)]
    pub wins: i64,
    /// Losses this season
    #[serde(default)]
    pub losses: i64,
}

/// Full match payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDto {
    /// Identifiers and versioning
    pub metadata: MatchMetadata,
    /// Game details
    #[serde(default)]
    pub info: MatchInfo,
}

/// Match metadata block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Globally unique match id
    pub match_id: String,
    /// Payload version tag
    #[serde(default)]
    pub data_version: String,
    /// Player keys of the lobby
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Match info block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    /// Start time, unix epoch milliseconds
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
    /// One entry per lobby player
    pub participants: Vec<ParticipantDto>,
}

/// One player's result in a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantDto {
    /// Player key
    pub puuid: String,
    /// Final placement (1 = winner)
    pub placement: Option<i64>,
    /// Final level
    pub level: Option<i64>,
    /// Gold left at elimination or game end
    pub gold_left: Option<i64>,
    /// Last round reached
    pub last_round: Option<i64>,
    /// Players eliminated by this player
    pub players_eliminated: Option<i64>,
    /// Seconds into the game when eliminated
    pub time_eliminated: Option<f64>,
    /// Damage dealt to other players
    pub total_damage_to_players: Option<i64>,
    /// Augment ids in pick order
    pub augments: Vec<String>,
    /// Active traits
    pub traits: Vec<TraitDto>,
    /// Units on the final board
    pub units: Vec<UnitDto>,
}

/// Trait activation on a final board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitDto {
    /// Trait name
    pub name: String,
    /// Units contributing to the trait
    pub num_units: Option<i64>,
    /// Style / rank indicator
    pub style: Option<i64>,
    /// Current activation tier
    pub tier_current: Option<i64>,
    /// Maximum activation tier
    pub tier_total: Option<i64>,
}

/// Unit on a final board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitDto {
    /// Character id
    pub character_id: String,
    /// Item display names, in slot order
    #[serde(rename = "itemNames")]
    pub item_names: Vec<String>,
    /// Numeric item ids, possibly shorter than `item_names`
    pub items: Vec<i64>,
    /// Rarity cost
    pub rarity: Option<i64>,
    /// Star tier
    pub tier: Option<i64>,
}
