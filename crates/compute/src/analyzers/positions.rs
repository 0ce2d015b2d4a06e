//! Per-player defensive setup positions.

use std::collections::BTreeMap;

use scout_core::{Cluster, MapId, MatchDocument, PlayerId, Side};
use serde::{Deserialize, Serialize};

use super::common::{
    live_teammates, player_name, reference_snapshot, round_key, rounds_on_side, team_games,
    DEFENSE_REFERENCE_SECS, POSITION_CLUSTER_RADIUS,
};
use super::{AnalysisContext, Analyzer, AnalyzerPayload};
use crate::algorithms::{greedy_clusters, Sample};

/// Clusters for one player on one map, with the round count they are
/// measured against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerClusters {
    pub name: String,
    pub rounds: u32,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPayload {
    pub maps: BTreeMap<MapId, BTreeMap<PlayerId, PlayerClusters>>,
}

pub struct PlayerPositionAnalyzer;

impl Analyzer for PlayerPositionAnalyzer {
    fn name(&self) -> &'static str {
        "player_positions"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut rounds: BTreeMap<(MapId, PlayerId), u32> = BTreeMap::new();
        let mut samples: BTreeMap<(MapId, PlayerId), Vec<Sample>> = BTreeMap::new();
        let mut names: BTreeMap<PlayerId, String> = BTreeMap::new();

        for game in team_games(doc, team_id) {
            for round in rounds_on_side(game, team_id, Side::Defender) {
                if round.freezetime_ended_at.is_none() {
                    continue;
                }
                for player in game.team_players(team_id) {
                    *rounds
                        .entry((game.map_id.clone(), player.id.clone()))
                        .or_default() += 1;
                    names
                        .entry(player.id.clone())
                        .or_insert_with(|| player_name(game, &player.id));
                }
                let Some(snapshot) = reference_snapshot(round, DEFENSE_REFERENCE_SECS) else {
                    continue;
                };
                let this_round = round_key(doc, game, round);
                for (player, pos) in live_teammates(game, round, team_id, snapshot) {
                    samples
                        .entry((game.map_id.clone(), player.id.clone()))
                        .or_default()
                        .push(Sample::plain(pos).in_round(this_round.as_str()));
                }
            }
        }

        if rounds.is_empty() {
            return None;
        }

        let mut payload = PositionPayload::default();
        for ((map_id, player_id), round_count) in rounds {
            let clusters = samples
                .get(&(map_id.clone(), player_id.clone()))
                .map(|s| greedy_clusters(s, POSITION_CLUSTER_RADIUS))
                .unwrap_or_default()
                .into_iter()
                .map(|mut c| {
                    c.label = Some(ctx.callouts.callout_of(&map_id, c.centroid));
                    c
                })
                .collect();
            let name = names.get(&player_id).cloned().unwrap_or_else(|| player_id.clone());
            payload.maps.entry(map_id).or_default().insert(
                player_id,
                PlayerClusters {
                    name,
                    rounds: round_count,
                    clusters,
                },
            );
        }
        Some(AnalyzerPayload::PlayerPositions(payload))
    }
}
