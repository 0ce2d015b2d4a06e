//! Ability (utility) usage hotspots per player.
//!
//! Usages are clustered greedily, never mixing different abilities or
//! agents. Clusters smaller than the minimum size are noise and dropped.

use std::collections::BTreeMap;

use scout_core::{Discriminator, MapId, MatchDocument, PlayerId};
use serde::{Deserialize, Serialize};

use super::common::{round_key, team_games, ABILITY_CLUSTER_RADIUS, MIN_ABILITY_CLUSTER};
use super::positions::PlayerClusters;
use super::{AnalysisContext, Analyzer, AnalyzerPayload};
use crate::algorithms::{greedy_clusters, Sample};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityPayload {
    pub maps: BTreeMap<MapId, BTreeMap<PlayerId, PlayerClusters>>,
}

pub struct AbilityHotspotAnalyzer;

impl Analyzer for AbilityHotspotAnalyzer {
    fn name(&self) -> &'static str {
        "ability_hotspots"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut payload = AbilityPayload::default();

        for game in team_games(doc, team_id) {
            let played: Vec<_> = game
                .rounds
                .iter()
                .filter(|r| r.freezetime_ended_at.is_some())
                .collect();

            for player in game.team_players(team_id) {
                let samples: Vec<Sample> = played
                    .iter()
                    .flat_map(|&r| {
                        let key = round_key(doc, game, r);
                        r.ability_usages
                            .iter()
                            .map(move |u| (key.clone(), u))
                    })
                    .filter(|(_, u)| u.player_id == player.id)
                    .filter_map(|(key, u)| {
                        let agent = u.character_id.clone().or_else(|| player.character_id.clone());
                        u.position.map(|pos| {
                            Sample::tagged(pos, Discriminator::ability(u.ability_id.clone(), agent))
                                .in_round(key)
                        })
                    })
                    .collect();

                let clusters: Vec<_> = greedy_clusters(&samples, ABILITY_CLUSTER_RADIUS)
                    .into_iter()
                    .filter(|c| c.count >= MIN_ABILITY_CLUSTER)
                    .map(|mut c| {
                        c.label = Some(ctx.callouts.callout_of(&game.map_id, c.centroid));
                        c
                    })
                    .collect();

                let entry = payload
                    .maps
                    .entry(game.map_id.clone())
                    .or_default()
                    .entry(player.id.clone())
                    .or_insert_with(|| PlayerClusters {
                        name: player.name.clone(),
                        rounds: 0,
                        clusters: Vec::new(),
                    });
                entry.rounds += played.len() as u32;
                entry.clusters.extend(clusters);
            }
        }

        let any_cluster = payload
            .maps
            .values()
            .flat_map(|players| players.values())
            .any(|p| !p.clusters.is_empty());
        if !any_cluster {
            return None;
        }
        Some(AnalyzerPayload::AbilityHotspots(payload))
    }
}
