//! Match payload normalization
//!
//! Flattens a fetched [`MatchDto`] into the row hierarchy written by
//! [`Store::insert_match`](crate::store::Store::insert_match).

use crate::client::types::{ParticipantDto, TraitDto, UnitDto};
use crate::client::{MatchDto, Region};
use crate::store::{AugmentRow, ItemRow, MatchRecord, ParticipantRow, TraitRow, UnitRow};

/// Build the row hierarchy for a match fetched from `region`
pub fn normalize_match(dto: &MatchDto, region: Region) -> MatchRecord {
    let info = &dto.info;
    MatchRecord {
        match_id: dto.metadata.match_id.clone(),
        data_version: dto.metadata.data_version.clone(),
        game_datetime: info.game_datetime,
        game_length: info.game_length,
        game_version: info.game_version.clone(),
        queue_id: info.queue_id,
        tft_game_type: info.tft_game_type.clone(),
        tft_set_number: info.tft_set_number,
        tft_set_core_name: info.tft_set_core_name.clone(),
        region: region.as_str().to_string(),
        participants: info.participants.iter().map(participant_row).collect(),
    }
}

fn participant_row(p: &ParticipantDto) -> ParticipantRow {
    ParticipantRow {
        puuid: p.puuid.clone(),
        placement: p.placement,
        level: p.level,
        gold_left: p.gold_left,
        last_round: p.last_round,
        players_eliminated: p.players_eliminated,
        time_eliminated: p.time_eliminated,
        total_damage_to_players: p.total_damage_to_players,
        augments: augment_rows(&p.augments),
        traits: p.traits.iter().map(trait_row).collect(),
        units: p.units.iter().map(unit_row).collect(),
    }
}

/// Augments keep source order; pick order starts at 1
fn augment_rows(augments: &[String]) -> Vec<AugmentRow> {
    augments
        .iter()
        .zip(1i64..)
        .map(|(augment_id, pick_order)| AugmentRow {
            augment_id: augment_id.clone(),
            pick_order,
        })
        .collect()
}

fn trait_row(t: &TraitDto) -> TraitRow {
    TraitRow {
        name: t.name.clone(),
        num_units: t.num_units,
        style: t.style,
        tier_current: t.tier_current,
        tier_total: t.tier_total,
    }
}

fn unit_row(u: &UnitDto) -> UnitRow {
    UnitRow {
        character_id: u.character_id.clone(),
        tier: u.tier,
        rarity: u.rarity,
        items: item_rows(&u.item_names, &u.items),
    }
}

/// Pair names with ids by position. One row per name; missing ids are `None`.
pub fn item_rows(names: &[String], ids: &[i64]) -> Vec<ItemRow> {
    names
        .iter()
        .enumerate()
        .map(|(slot, name)| ItemRow {
            item_id: ids.get(slot).copied(),
            item_name: name.clone(),
        })
        .collect()
}
