//! Order-independent reduction of per-match analyzer payloads.
//!
//! Only counts and member sets are accumulated; every percentage and
//! centroid is computed once in [`ReportAccumulator::finish`]. Members are
//! kept in canonical order so the result does not depend on the order in
//! which matches were absorbed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use scout_core::{CentroidMode, Cluster, Discriminator, MapId, PlayerId};
use tracing::debug;

use super::series::SeriesAnalysis;
use super::types::*;
use crate::analyzers::agents::AgentPick;
use crate::analyzers::common::{
    TOP_ABILITY_CLUSTERS, TOP_ECONOMY_FORMATIONS, TOP_FORMATIONS, TOP_POSITION_CLUSTERS,
    TOP_POST_PLANT_CLUSTERS,
};
use crate::analyzers::formations::{EconomyCounts, FormationCounts};
use crate::analyzers::lurk::MapLurk;
use crate::analyzers::positions::PlayerClusters;
use crate::analyzers::veto::MapAvailability;
use crate::analyzers::{
    AbilityPayload, AgentPayload, AnalyzerPayload, EconomyPayload, FormationPayload, LurkPayload,
    MapsPayload, PositionPayload, PostPlantPayload, VetoPayload,
};

type ClusterKey = (String, Discriminator);

#[derive(Debug, Clone, Default)]
struct VetoAcc {
    series: u32,
    ban_phase1: BTreeMap<String, u32>,
    ban_phase2: BTreeMap<String, u32>,
    picks: BTreeMap<String, u32>,
    deciders: BTreeMap<String, u32>,
    opponent_phase1_bans: BTreeMap<String, u32>,
    availability: BTreeMap<MapId, MapAvailability>,
}

#[derive(Debug, Clone, Copy, Default)]
struct MapCount {
    played: u32,
    won: u32,
}

#[derive(Debug, Clone, Default)]
struct AgentAcc {
    name: String,
    games: u32,
    picks: BTreeMap<AgentPick, u32>,
}

#[derive(Debug, Clone, Default)]
struct PlayerClusterAcc {
    name: String,
    rounds: u32,
    clusters: BTreeMap<ClusterKey, Cluster>,
}

#[derive(Debug, Clone, Default)]
struct SiteAcc {
    plants: u32,
    clusters: BTreeMap<ClusterKey, Cluster>,
}

type PlayerClusterMaps = BTreeMap<MapId, BTreeMap<PlayerId, PlayerClusterAcc>>;

/// Running totals for one team's report.
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    team_name: String,
    series: u32,
    veto: Option<VetoAcc>,
    maps: Option<BTreeMap<MapId, MapCount>>,
    agents: Option<BTreeMap<PlayerId, AgentAcc>>,
    defensive: Option<BTreeMap<MapId, FormationCounts>>,
    offensive: Option<BTreeMap<MapId, FormationCounts>>,
    economy: Option<BTreeMap<MapId, EconomyCounts>>,
    positions: Option<PlayerClusterMaps>,
    abilities: Option<PlayerClusterMaps>,
    post_plant: Option<BTreeMap<MapId, BTreeMap<String, SiteAcc>>>,
    lurk: Option<BTreeMap<MapId, MapLurk>>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one match's results in.
    pub fn absorb(&mut self, series: &SeriesAnalysis) {
        self.series += 1;
        keep_name(&mut self.team_name, &series.team_name);
        for result in &series.results {
            self.absorb_payload(&result.payload);
        }
        debug!(
            match_id = %series.match_id,
            results = series.results.len(),
            "series absorbed"
        );
    }

    fn absorb_payload(&mut self, payload: &AnalyzerPayload) {
        match payload {
            AnalyzerPayload::Veto(p) => self.absorb_veto(p),
            AnalyzerPayload::Maps(p) => self.absorb_maps(p),
            AnalyzerPayload::Agents(p) => self.absorb_agents(p),
            AnalyzerPayload::DefensiveFormations(p) => {
                absorb_formations(self.defensive.get_or_insert_with(BTreeMap::new), p)
            }
            AnalyzerPayload::OffensiveFormations(p) => {
                absorb_formations(self.offensive.get_or_insert_with(BTreeMap::new), p)
            }
            AnalyzerPayload::EconomyFormations(p) => self.absorb_economy(p),
            AnalyzerPayload::PlayerPositions(PositionPayload { maps }) => absorb_player_clusters(
                self.positions.get_or_insert_with(BTreeMap::new),
                maps,
                CentroidMode::Mean,
            ),
            AnalyzerPayload::AbilityHotspots(AbilityPayload { maps }) => absorb_player_clusters(
                self.abilities.get_or_insert_with(BTreeMap::new),
                maps,
                CentroidMode::Mean,
            ),
            AnalyzerPayload::PostPlant(p) => self.absorb_post_plant(p),
            AnalyzerPayload::Lurk(p) => self.absorb_lurk(p),
            AnalyzerPayload::Playback(_) => {}
        }
    }

    fn absorb_veto(&mut self, p: &VetoPayload) {
        let acc = self.veto.get_or_insert_with(VetoAcc::default);
        acc.series += 1;
        count_all(&mut acc.ban_phase1, &p.ban_phase1);
        count_all(&mut acc.ban_phase2, &p.ban_phase2);
        count_all(&mut acc.picks, &p.picks);
        count_all(&mut acc.deciders, p.decider.iter());
        count_all(&mut acc.opponent_phase1_bans, &p.opponent_phase1_bans);
        for (map, availability) in &p.availability {
            acc.availability
                .entry(map.clone())
                .or_default()
                .add(availability);
        }
    }

    fn absorb_maps(&mut self, p: &MapsPayload) {
        let acc = self.maps.get_or_insert_with(BTreeMap::new);
        for map in &p.played {
            acc.entry(map.clone()).or_default().played += 1;
        }
        for map in &p.won {
            acc.entry(map.clone()).or_default().won += 1;
        }
    }

    fn absorb_agents(&mut self, p: &AgentPayload) {
        let acc = self.agents.get_or_insert_with(BTreeMap::new);
        for (player_id, player) in &p.players {
            let entry = acc.entry(player_id.clone()).or_default();
            keep_name(&mut entry.name, &player.name);
            for pick in &player.picks {
                entry.games += 1;
                *entry.picks.entry(pick.clone()).or_default() += 1;
            }
        }
    }

    fn absorb_economy(&mut self, p: &EconomyPayload) {
        let acc = self.economy.get_or_insert_with(BTreeMap::new);
        for (map, counts) in &p.maps {
            acc.entry(map.clone()).or_default().add(counts);
        }
    }

    fn absorb_post_plant(&mut self, p: &PostPlantPayload) {
        let acc = self.post_plant.get_or_insert_with(BTreeMap::new);
        for (map, sites) in &p.maps {
            let map_acc = acc.entry(map.clone()).or_default();
            for (site, holds) in sites {
                let site_acc = map_acc.entry(site.clone()).or_default();
                site_acc.plants += holds.plants;
                for cluster in &holds.clusters {
                    merge_cluster(&mut site_acc.clusters, cluster, CentroidMode::Median);
                }
            }
        }
    }

    fn absorb_lurk(&mut self, p: &LurkPayload) {
        let acc = self.lurk.get_or_insert_with(BTreeMap::new);
        for (map, lurk) in &p.maps {
            let map_acc = acc.entry(map.clone()).or_default();
            map_acc.attack_rounds += lurk.attack_rounds;
            map_acc.lurk_rounds += lurk.lurk_rounds;
            for (player_id, player) in &lurk.players {
                let entry = map_acc.players.entry(player_id.clone()).or_default();
                keep_name(&mut entry.name, &player.name);
                entry.attack_rounds += player.attack_rounds;
                entry.lurk_rounds += player.lurk_rounds;
            }
        }
    }

    /// Build the report. `series_breakdown` is attached verbatim.
    pub fn finish(
        self,
        team_id: &str,
        series_breakdown: Vec<super::series::SeriesBreakdown>,
        generated_at: DateTime<Utc>,
    ) -> ScoutingReport {
        let maps_played = self
            .maps
            .as_ref()
            .map(|m| m.values().map(|c| c.played).sum())
            .unwrap_or(0);
        let team_name = if self.team_name.is_empty() {
            team_id.to_string()
        } else {
            self.team_name
        };

        ScoutingReport {
            team_id: team_id.to_string(),
            team_name,
            series_analyzed: self.series,
            maps_played,
            generated_at,
            veto_stats: self.veto.map(finish_veto),
            map_stats: self.maps.map(|m| finish_maps(m, maps_played)),
            agent_stats: self.agents.map(finish_agents),
            defensive_formations: self.defensive.map(|m| finish_formations(m, TOP_FORMATIONS)),
            offensive_formations: self.offensive.map(|m| finish_formations(m, TOP_FORMATIONS)),
            economy_formations: self.economy.map(finish_economy),
            position_clusters: self
                .positions
                .map(|m| finish_player_clusters(m, CentroidMode::Mean, TOP_POSITION_CLUSTERS)),
            ability_hotspots: self
                .abilities
                .map(|m| finish_player_clusters(m, CentroidMode::Mean, TOP_ABILITY_CLUSTERS)),
            post_plant_positions: self.post_plant.map(finish_post_plant),
            lurk_stats: self.lurk.map(finish_lurk),
            series_breakdown,
        }
    }
}

/// `count / denominator` as a percentage; zero when the denominator is zero.
pub fn percentage(count: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count as f64 * 100.0 / denominator as f64
    }
}

/// Prefer the lexicographically smallest non-empty name.
fn keep_name(current: &mut String, candidate: &str) {
    if !candidate.is_empty() && (current.is_empty() || candidate < current.as_str()) {
        *current = candidate.to_string();
    }
}

fn count_all<'a>(counts: &mut BTreeMap<String, u32>, keys: impl IntoIterator<Item = &'a String>) {
    for key in keys {
        *counts.entry(key.clone()).or_default() += 1;
    }
}

fn absorb_formations(acc: &mut BTreeMap<MapId, FormationCounts>, p: &FormationPayload) {
    for (map, counts) in &p.maps {
        acc.entry(map.clone()).or_default().add(counts);
    }
}

fn absorb_player_clusters(
    acc: &mut PlayerClusterMaps,
    maps: &BTreeMap<MapId, BTreeMap<PlayerId, PlayerClusters>>,
    mode: CentroidMode,
) {
    for (map, players) in maps {
        let map_acc = acc.entry(map.clone()).or_default();
        for (player_id, player) in players {
            let entry = map_acc.entry(player_id.clone()).or_default();
            keep_name(&mut entry.name, &player.name);
            entry.rounds += player.rounds;
            for cluster in &player.clusters {
                merge_cluster(&mut entry.clusters, cluster, mode);
            }
        }
    }
}

fn cluster_key(cluster: &Cluster) -> ClusterKey {
    (
        cluster.label.clone().unwrap_or_default(),
        cluster.discriminator.clone(),
    )
}

fn merge_cluster(acc: &mut BTreeMap<ClusterKey, Cluster>, cluster: &Cluster, mode: CentroidMode) {
    let key = cluster_key(cluster);
    match acc.get_mut(&key) {
        Some(existing) => existing.merge(cluster, mode),
        None => {
            acc.insert(key, cluster.clone());
        }
    }
}

/// Sort by count descending, then key ascending, and keep the first `top`.
fn ranked(
    counts: impl IntoIterator<Item = (String, u32)>,
    denominator: u32,
    top: Option<usize>,
) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(key, count)| FrequencyEntry {
            percentage: percentage(count, denominator),
            key,
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    if let Some(top) = top {
        entries.truncate(top);
    }
    entries
}

fn frequency_table(counts: BTreeMap<String, u32>) -> FrequencyTable {
    let total = counts.values().sum();
    FrequencyTable {
        total,
        entries: ranked(counts, total, None),
    }
}

/// Percentage is distinct covered rounds over `denominator`. Ranked by
/// covered rounds, then member count, then key.
fn ranked_clusters(
    clusters: BTreeMap<ClusterKey, Cluster>,
    mode: CentroidMode,
    denominator: u32,
    top: usize,
) -> Vec<ClusterStats> {
    let mut out: Vec<ClusterStats> = clusters
        .into_iter()
        .map(|((label, _), mut cluster)| {
            cluster.members.sort_by(|a, b| a.canonical_cmp(b));
            cluster.count = cluster.members.len();
            cluster.centroid = mode.centroid(&cluster.members);
            cluster.label = Some(label);
            ClusterStats {
                percentage: percentage(cluster.round_count() as u32, denominator),
                cluster,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.cluster
            .round_count()
            .cmp(&a.cluster.round_count())
            .then_with(|| b.cluster.count.cmp(&a.cluster.count))
            .then_with(|| a.cluster.label.cmp(&b.cluster.label))
            .then_with(|| a.cluster.discriminator.cmp(&b.cluster.discriminator))
    });
    out.truncate(top);
    out
}

fn finish_veto(acc: VetoAcc) -> VetoStats {
    VetoStats {
        series_with_veto: acc.series,
        ban_phase1: frequency_table(acc.ban_phase1),
        ban_phase2: frequency_table(acc.ban_phase2),
        picks: frequency_table(acc.picks),
        deciders: frequency_table(acc.deciders),
        opponent_phase1_bans: frequency_table(acc.opponent_phase1_bans),
        availability: acc
            .availability
            .into_iter()
            .map(|(map_id, a)| MapAvailabilityStats {
                map_id,
                ban_available: a.ban_available,
                banned: a.banned,
                ban_rate: percentage(a.banned, a.ban_available),
                pick_available: a.pick_available,
                picked: a.picked,
                pick_rate: percentage(a.picked, a.pick_available),
            })
            .collect(),
    }
}

fn finish_maps(acc: BTreeMap<MapId, MapCount>, total_games: u32) -> Vec<MapStats> {
    let mut out: Vec<MapStats> = acc
        .into_iter()
        .map(|(map_id, c)| MapStats {
            map_id,
            played: c.played,
            won: c.won,
            play_rate: percentage(c.played, total_games),
            win_rate: percentage(c.won, c.played),
        })
        .collect();
    out.sort_by(|a, b| b.played.cmp(&a.played).then_with(|| a.map_id.cmp(&b.map_id)));
    out
}

fn finish_agents(acc: BTreeMap<PlayerId, AgentAcc>) -> Vec<PlayerAgentStats> {
    acc.into_iter()
        .map(|(player_id, a)| {
            let mut picks: Vec<AgentPickStats> = a
                .picks
                .into_iter()
                .map(|(pick, count)| AgentPickStats {
                    map_id: pick.map_id,
                    character_id: pick.character_id,
                    count,
                    percentage: percentage(count, a.games),
                })
                .collect();
            picks.sort_by(|x, y| {
                y.count
                    .cmp(&x.count)
                    .then_with(|| x.map_id.cmp(&y.map_id))
                    .then_with(|| x.character_id.cmp(&y.character_id))
            });
            PlayerAgentStats {
                player_name: if a.name.is_empty() { player_id.clone() } else { a.name },
                player_id,
                games: a.games,
                picks,
            }
        })
        .collect()
}

fn finish_formations(acc: BTreeMap<MapId, FormationCounts>, top: usize) -> Vec<MapFormations> {
    acc.into_iter()
        .map(|(map_id, counts)| MapFormations {
            map_id,
            rounds: counts.rounds,
            formations: ranked(counts.formations, counts.rounds, Some(top)),
        })
        .collect()
}

fn economy_bucket(counts: FormationCounts) -> EconomyBucket {
    EconomyBucket {
        rounds: counts.rounds,
        formations: ranked(counts.formations, counts.rounds, Some(TOP_ECONOMY_FORMATIONS)),
    }
}

fn finish_economy(acc: BTreeMap<MapId, EconomyCounts>) -> Vec<MapEconomyFormations> {
    acc.into_iter()
        .map(|(map_id, counts)| MapEconomyFormations {
            map_id,
            buy: economy_bucket(counts.buy),
            eco: economy_bucket(counts.eco),
        })
        .collect()
}

fn finish_player_clusters(
    acc: PlayerClusterMaps,
    mode: CentroidMode,
    top: usize,
) -> Vec<MapPlayerClusters> {
    acc.into_iter()
        .map(|(map_id, players)| MapPlayerClusters {
            map_id,
            players: players
                .into_iter()
                .map(|(player_id, p)| PlayerClusterStats {
                    player_name: if p.name.is_empty() { player_id.clone() } else { p.name },
                    player_id,
                    rounds: p.rounds,
                    clusters: ranked_clusters(p.clusters, mode, p.rounds, top),
                })
                .collect(),
        })
        .collect()
}

fn finish_post_plant(acc: BTreeMap<MapId, BTreeMap<String, SiteAcc>>) -> Vec<MapPostPlant> {
    acc.into_iter()
        .map(|(map_id, sites)| MapPostPlant {
            map_id,
            sites: sites
                .into_iter()
                .map(|(site, s)| SitePostPlant {
                    site,
                    plants: s.plants,
                    clusters: ranked_clusters(
                        s.clusters,
                        CentroidMode::Median,
                        s.plants,
                        TOP_POST_PLANT_CLUSTERS,
                    ),
                })
                .collect(),
        })
        .collect()
}

fn finish_lurk(acc: BTreeMap<MapId, MapLurk>) -> Vec<MapLurkStats> {
    acc.into_iter()
        .map(|(map_id, lurk)| MapLurkStats {
            map_id,
            attack_rounds: lurk.attack_rounds,
            lurk_rounds: lurk.lurk_rounds,
            lurk_rate: percentage(lurk.lurk_rounds, lurk.attack_rounds),
            players: lurk
                .players
                .into_iter()
                .map(|(player_id, p)| PlayerLurkStats {
                    player_name: if p.name.is_empty() { player_id.clone() } else { p.name },
                    player_id,
                    attack_rounds: p.attack_rounds,
                    lurk_rounds: p.lurk_rounds,
                    lurk_rate: percentage(p.lurk_rounds, p.attack_rounds),
                })
                .collect(),
        })
        .collect()
}
