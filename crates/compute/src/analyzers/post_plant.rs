//! Where attackers hold after planting.

use std::collections::BTreeMap;

use chrono::Duration;
use scout_core::callouts::UNKNOWN_REGION;
use scout_core::{BombEvent, CentroidMode, Cluster, MapId, MatchDocument, Side};
use serde::{Deserialize, Serialize};

use super::common::{
    live_teammates, round_key, rounds_on_side, team_games, POST_PLANT_CLUSTER_RADIUS,
    POST_PLANT_REFERENCE_SECS,
};
use super::{AnalysisContext, Analyzer, AnalyzerPayload};
use crate::algorithms::{connected_components, Sample};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteHolds {
    pub plants: u32,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPlantPayload {
    /// Map → site → holds.
    pub maps: BTreeMap<MapId, BTreeMap<String, SiteHolds>>,
}

pub struct PostPlantAnalyzer;

impl Analyzer for PostPlantAnalyzer {
    fn name(&self) -> &'static str {
        "post_plant"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut plants: BTreeMap<(MapId, String), u32> = BTreeMap::new();
        let mut samples: BTreeMap<(MapId, String), Vec<Sample>> = BTreeMap::new();

        for game in team_games(doc, team_id) {
            for round in rounds_on_side(game, team_id, Side::Attacker) {
                let Some(plant) = &round.bomb_plant else {
                    continue;
                };
                let key = (game.map_id.clone(), plant_site(ctx, &game.map_id, plant));
                *plants.entry(key.clone()).or_default() += 1;

                let reference = plant.timestamp + Duration::seconds(POST_PLANT_REFERENCE_SECS);
                let Some(snapshot) = round.snapshot_closest_to(reference) else {
                    continue;
                };
                let held = live_teammates(game, round, team_id, snapshot);
                let this_round = round_key(doc, game, round);
                samples.entry(key).or_default().extend(
                    held.into_iter()
                        .map(|(_, pos)| Sample::plain(pos).in_round(this_round.as_str())),
                );
            }
        }

        if plants.is_empty() {
            return None;
        }

        let mut payload = PostPlantPayload::default();
        for ((map_id, site), plant_count) in plants {
            let clusters = samples
                .get(&(map_id.clone(), site.clone()))
                .map(|s| connected_components(s, POST_PLANT_CLUSTER_RADIUS, CentroidMode::Median))
                .unwrap_or_default()
                .into_iter()
                .map(|mut c| {
                    c.label = Some(ctx.callouts.callout_of(&map_id, c.centroid));
                    c
                })
                .collect();
            payload.maps.entry(map_id).or_default().insert(
                site,
                SiteHolds {
                    plants: plant_count,
                    clusters,
                },
            );
        }
        Some(AnalyzerPayload::PostPlant(payload))
    }
}

/// Provider site label, else the super region of the plant position.
fn plant_site(ctx: &AnalysisContext<'_>, map_id: &str, plant: &BombEvent) -> String {
    if let Some(site) = plant.site.as_deref().filter(|s| !s.is_empty()) {
        return site.to_string();
    }
    plant
        .position
        .map(|pos| ctx.callouts.super_region_of(map_id, pos))
        .unwrap_or_else(|| UNKNOWN_REGION.to_string())
}
