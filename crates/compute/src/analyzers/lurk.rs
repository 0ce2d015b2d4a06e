//! Lurk detection on attack.
//!
//! Within the early-round window, each snapshot is searched for the largest
//! "pack": at least three live teammates sharing one super region and all
//! mutually within the pack radius. Live teammates outside the pack's region
//! are lurking. A round is credited at most once, at the first snapshot
//! that shows a pack and at least one lurker.

use std::collections::BTreeMap;

use chrono::Duration;
use scout_core::{MapId, MatchDocument, PlayerId, Point, Side};
use serde::{Deserialize, Serialize};

use super::common::{
    live_teammates, rounds_on_side, team_games, LURK_MIN_PACK, LURK_PACK_RADIUS,
    LURK_WINDOW_END_SECS, LURK_WINDOW_START_SECS,
};
use super::{AnalysisContext, Analyzer, AnalyzerPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LurkPayload {
    pub maps: BTreeMap<MapId, MapLurk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLurk {
    pub attack_rounds: u32,
    pub lurk_rounds: u32,
    pub players: BTreeMap<PlayerId, PlayerLurk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLurk {
    pub name: String,
    pub attack_rounds: u32,
    pub lurk_rounds: u32,
}

/// Largest subset size searched exhaustively.
const MAX_SEARCH: usize = 12;

pub struct LurkAnalyzer;

impl Analyzer for LurkAnalyzer {
    fn name(&self) -> &'static str {
        "lurk"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut payload = LurkPayload::default();

        for game in team_games(doc, team_id) {
            for round in rounds_on_side(game, team_id, Side::Attacker) {
                let Some(ended) = round.freezetime_ended_at else {
                    continue;
                };
                let map = payload.maps.entry(game.map_id.clone()).or_default();
                map.attack_rounds += 1;
                for player in game.team_players(team_id) {
                    let entry = map
                        .players
                        .entry(player.id.clone())
                        .or_insert_with(|| PlayerLurk {
                            name: player.name.clone(),
                            ..PlayerLurk::default()
                        });
                    entry.attack_rounds += 1;
                }

                let window_start = ended + Duration::seconds(LURK_WINDOW_START_SECS);
                let window_end = ended + Duration::seconds(LURK_WINDOW_END_SECS);
                let lurkers = round
                    .coordinate_tracking
                    .iter()
                    .filter(|s| s.timestamp >= window_start && s.timestamp <= window_end)
                    .find_map(|snapshot| {
                        let live: Vec<(PlayerId, Point)> =
                            live_teammates(game, round, team_id, snapshot)
                                .into_iter()
                                .map(|(p, pos)| (p.id.clone(), pos))
                                .collect();
                        detect_lurkers(ctx, &game.map_id, &live).filter(|l| !l.is_empty())
                    });

                if let Some(lurkers) = lurkers {
                    map.lurk_rounds += 1;
                    for id in lurkers {
                        if let Some(entry) = map.players.get_mut(&id) {
                            entry.lurk_rounds += 1;
                        }
                    }
                }
            }
        }

        if payload.maps.is_empty() {
            return None;
        }
        Some(AnalyzerPayload::Lurk(payload))
    }
}

/// Players outside the largest pack's region, or `None` when no pack of
/// at least the minimum size exists.
pub fn detect_lurkers(
    ctx: &AnalysisContext<'_>,
    map_id: &str,
    live: &[(PlayerId, Point)],
) -> Option<Vec<PlayerId>> {
    let n = live.len();
    if n < LURK_MIN_PACK || n > MAX_SEARCH {
        return None;
    }
    let regions: Vec<String> = live
        .iter()
        .map(|(_, pos)| ctx.callouts.super_region_of(map_id, *pos))
        .collect();

    for size in (LURK_MIN_PACK..=n).rev() {
        for mask in 0u32..(1 << n) {
            if mask.count_ones() as usize != size {
                continue;
            }
            let members: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
            if !is_pack(live, &regions, &members) {
                continue;
            }
            let region = &regions[members[0]];
            let lurkers = (0..n)
                .filter(|&i| &regions[i] != region)
                .map(|i| live[i].0.clone())
                .collect();
            return Some(lurkers);
        }
    }
    None
}

fn is_pack(live: &[(PlayerId, Point)], regions: &[String], members: &[usize]) -> bool {
    let region = &regions[members[0]];
    if members.iter().any(|&i| &regions[i] != region) {
        return false;
    }
    members.iter().enumerate().all(|(a, &i)| {
        members[a + 1..]
            .iter()
            .all(|&j| live[i].1.distance(&live[j].1) <= LURK_PACK_RADIUS)
    })
}

#[cfg(test)]
mod tests {
    use scout_core::Title;

    use super::*;
    use crate::analyzers::common::fixtures::*;

    fn live(points: &[(&str, f64, f64)]) -> Vec<(PlayerId, Point)> {
        points
            .iter()
            .map(|&(id, x, y)| (id.to_string(), Point::new(x, y)))
            .collect()
    }

    #[test]
    fn pack_with_one_lurker() {
        let table = callouts();
        let ctx = AnalysisContext::new(&table);
        let players = live(&[
            ("a", 4900.0, 0.0),
            ("b", 5000.0, 100.0),
            ("c", 5100.0, 0.0),
            ("d", 5050.0, -50.0),
            ("e", 0.0, 0.0),
        ]);
        assert_eq!(detect_lurkers(&ctx, "ascent", &players), Some(vec!["e".to_string()]));
    }

    #[test]
    fn spread_region_is_not_a_pack() {
        let table = callouts();
        let ctx = AnalysisContext::new(&table);
        // Same region by nearest anchor, but too far apart.
        let players = live(&[("a", 4000.0, -1000.0), ("b", 6000.0, 1000.0), ("c", 5000.0, -2500.0)]);
        assert_eq!(detect_lurkers(&ctx, "ascent", &players), None);
    }

    #[test]
    fn too_few_players() {
        let table = callouts();
        let ctx = AnalysisContext::new(&table);
        let players = live(&[("a", 0.0, 0.0), ("b", 10.0, 0.0)]);
        assert_eq!(detect_lurkers(&ctx, "ascent", &players), None);
    }

    #[test]
    fn credited_once_per_round_inside_window() {
        let pack = [
            ("t1p0", 5000.0, 0.0),
            ("t1p1", 5010.0, 0.0),
            ("t1p2", 5020.0, 0.0),
            ("t1p3", 0.0, 0.0),
        ];
        let mut r = round(1, "t1", Side::Attacker, None);
        r.coordinate_tracking = vec![
            // Before the window: ignored.
            snapshot(2, &pack),
            snapshot(6, &pack),
            snapshot(12, &pack),
        ];
        let mut late = round(2, "t1", Side::Attacker, None);
        late.coordinate_tracking = vec![snapshot(31, &pack)];
        let doc = document(Title::Valorant, vec![game(1, "ascent", 4, vec![r, late])]);
        let table = callouts();

        let Some(AnalyzerPayload::Lurk(payload)) =
            LurkAnalyzer.analyze(&doc, "t1", &AnalysisContext::new(&table))
        else {
            panic!("expected lurk payload");
        };
        let map = &payload.maps["ascent"];
        assert_eq!(map.attack_rounds, 2);
        assert_eq!(map.lurk_rounds, 1);
        assert_eq!(map.players["t1p3"].lurk_rounds, 1);
        assert_eq!(map.players["t1p3"].attack_rounds, 2);
        assert_eq!(map.players["t1p0"].lurk_rounds, 0);
    }

    #[test]
    fn dead_lurker_is_not_counted() {
        let pack = [
            ("t1p0", 5000.0, 0.0),
            ("t1p1", 5010.0, 0.0),
            ("t1p2", 5020.0, 0.0),
            ("t1p3", 0.0, 0.0),
        ];
        let mut r = round(1, "t1", Side::Attacker, None);
        r.kills.push(kill(4, "t2p0", "t1p3"));
        r.coordinate_tracking = vec![snapshot(6, &pack)];
        let doc = document(Title::Valorant, vec![game(1, "ascent", 4, vec![r])]);
        let table = callouts();

        let Some(AnalyzerPayload::Lurk(payload)) =
            LurkAnalyzer.analyze(&doc, "t1", &AnalysisContext::new(&table))
        else {
            panic!("expected lurk payload");
        };
        assert_eq!(payload.maps["ascent"].lurk_rounds, 0);
        assert_eq!(payload.maps["ascent"].attack_rounds, 1);
    }
}
