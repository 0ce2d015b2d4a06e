//! Helpers shared by the positional analyzers.

use std::collections::BTreeMap;

use chrono::Duration;
use scout_core::{
    CoordinateSnapshot, GameRecord, MatchDocument, Point, RosterEntry, RoundRecord, Side, Title,
};

use super::AnalysisContext;

/// Defensive setups are read at freezetime end.
pub const DEFENSE_REFERENCE_SECS: i64 = 0;
/// Attack formations are read ten seconds into the round.
pub const OFFENSE_REFERENCE_SECS: i64 = 10;
/// Post-plant holds are read ten seconds after the plant.
pub const POST_PLANT_REFERENCE_SECS: i64 = 10;
pub const LURK_WINDOW_START_SECS: i64 = 5;
pub const LURK_WINDOW_END_SECS: i64 = 30;
pub const LURK_PACK_RADIUS: f64 = 1500.0;
pub const LURK_MIN_PACK: usize = 3;
pub const POSITION_CLUSTER_RADIUS: f64 = 400.0;
pub const ABILITY_CLUSTER_RADIUS: f64 = 300.0;
pub const POST_PLANT_CLUSTER_RADIUS: f64 = 500.0;
pub const MIN_ABILITY_CLUSTER: usize = 2;
/// First round of each half; the buy state is forced there.
pub const HALF_START_ROUNDS: [u32; 2] = [1, 13];

pub const TOP_FORMATIONS: usize = 10;
pub const TOP_ECONOMY_FORMATIONS: usize = 5;
pub const TOP_POSITION_CLUSTERS: usize = 5;
pub const TOP_ABILITY_CLUSTERS: usize = 15;
pub const TOP_POST_PLANT_CLUSTERS: usize = 10;

const VALORANT_HIGH_VALUE: &[&str] = &[
    "vandal", "phantom", "operator", "odin", "guardian", "bulldog", "marshal", "outlaw", "ares",
    "judge",
];

const CS2_HIGH_VALUE: &[&str] = &[
    "ak47",
    "m4a1",
    "m4a1_silencer",
    "m4a4",
    "awp",
    "aug",
    "sg556",
    "famas",
    "galilar",
    "ssg08",
];

/// Whether a purchased item counts as a full-buy weapon for the title.
pub fn is_high_value(title: Title, item_id: &str) -> bool {
    let item = item_id.trim().to_ascii_lowercase();
    let item = item.strip_prefix("weapon_").unwrap_or(&item);
    let table = match title {
        Title::Valorant => VALORANT_HIGH_VALUE,
        Title::Cs2 => CS2_HIGH_VALUE,
    };
    table.contains(&item)
}

/// Games in which `team_id` took part.
pub fn team_games<'a>(
    doc: &'a MatchDocument,
    team_id: &'a str,
) -> impl Iterator<Item = &'a GameRecord> + 'a {
    doc.games.iter().filter(move |game| {
        game.players.iter().any(|p| p.team_id == team_id)
            || game.rounds.iter().any(|r| r.side_of(team_id).is_some())
    })
}

/// Rounds of `game` in which `team_id` held `side`.
pub fn rounds_on_side<'a>(
    game: &'a GameRecord,
    team_id: &'a str,
    side: Side,
) -> impl Iterator<Item = &'a RoundRecord> + 'a {
    game.rounds
        .iter()
        .filter(move |round| round.side_of(team_id) == Some(side))
}

/// Key identifying one round across every analyzed match.
pub fn round_key(doc: &MatchDocument, game: &GameRecord, round: &RoundRecord) -> String {
    format!("{}/{}/{}", doc.match_id, game.game_number, round.round_number)
}

/// First snapshot at or after freezetime end plus `offset_secs`.
pub fn reference_snapshot(round: &RoundRecord, offset_secs: i64) -> Option<&CoordinateSnapshot> {
    let ended = round.freezetime_ended_at?;
    round.snapshot_at_or_after(ended + Duration::seconds(offset_secs))
}

/// Teammates alive at the snapshot instant, paired with their position in it.
///
/// A player killed strictly before the instant is dropped; so is a player
/// missing from the snapshot.
pub fn live_teammates<'a>(
    game: &'a GameRecord,
    round: &RoundRecord,
    team_id: &'a str,
    snapshot: &CoordinateSnapshot,
) -> Vec<(&'a RosterEntry, Point)> {
    game.team_players(team_id)
        .filter(|p| round.alive_at(&p.id, snapshot.timestamp))
        .filter_map(|p| snapshot.position_of(&p.id).map(|pos| (p, pos)))
        .collect()
}

/// Canonical formation key: per-super-region head counts as
/// `"N Region"` entries, sorted by region and comma-joined.
pub fn formation_key(ctx: &AnalysisContext<'_>, map_id: &str, positions: &[Point]) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for pos in positions {
        *counts
            .entry(ctx.callouts.super_region_of(map_id, *pos))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(region, n)| format!("{n} {region}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name lookup on a game roster, falling back to the id.
pub fn player_name(game: &GameRecord, player_id: &str) -> String {
    game.player(player_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| player_id.to_string())
}
