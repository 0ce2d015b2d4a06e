use chrono::{DateTime, Utc};
use scout_core::{Cluster, MapId, PlayerId, TeamId};
use serde::{Deserialize, Serialize};

use super::series::SeriesBreakdown;

/// Aggregate scouting report for one team over many matches.
///
/// Every percentage is in `[0, 100]` relative to the denominator stored
/// next to it, and is left unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingReport {
    pub team_id: TeamId,
    pub team_name: String,
    pub series_analyzed: u32,
    pub maps_played: u32,
    pub generated_at: DateTime<Utc>,
    pub veto_stats: Option<VetoStats>,
    pub map_stats: Option<Vec<MapStats>>,
    pub agent_stats: Option<Vec<PlayerAgentStats>>,
    pub defensive_formations: Option<Vec<MapFormations>>,
    pub offensive_formations: Option<Vec<MapFormations>>,
    pub economy_formations: Option<Vec<MapEconomyFormations>>,
    pub position_clusters: Option<Vec<MapPlayerClusters>>,
    pub ability_hotspots: Option<Vec<MapPlayerClusters>>,
    pub post_plant_positions: Option<Vec<MapPostPlant>>,
    pub lurk_stats: Option<Vec<MapLurkStats>>,
    pub series_breakdown: Vec<SeriesBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEntry {
    pub key: String,
    pub count: u32,
    pub percentage: f64,
}

/// Occurrence counts over a combined set; `total` is the denominator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyTable {
    pub total: u32,
    pub entries: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoStats {
    pub series_with_veto: u32,
    pub ban_phase1: FrequencyTable,
    pub ban_phase2: FrequencyTable,
    pub picks: FrequencyTable,
    pub deciders: FrequencyTable,
    pub opponent_phase1_bans: FrequencyTable,
    pub availability: Vec<MapAvailabilityStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAvailabilityStats {
    pub map_id: MapId,
    pub ban_available: u32,
    pub banned: u32,
    /// banned / banAvailable.
    pub ban_rate: f64,
    pub pick_available: u32,
    pub picked: u32,
    /// picked / pickAvailable.
    pub pick_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    pub map_id: MapId,
    pub played: u32,
    pub won: u32,
    /// played / all games played.
    pub play_rate: f64,
    /// won / played.
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAgentStats {
    pub player_id: PlayerId,
    pub player_name: String,
    pub games: u32,
    pub picks: Vec<AgentPickStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPickStats {
    pub map_id: MapId,
    pub character_id: String,
    pub count: u32,
    /// count / the player's games.
    pub percentage: f64,
}

/// Formation keys for one map; percentages are over `rounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFormations {
    pub map_id: MapId,
    pub rounds: u32,
    pub formations: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyBucket {
    pub rounds: u32,
    pub formations: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEconomyFormations {
    pub map_id: MapId,
    pub buy: EconomyBucket,
    pub eco: EconomyBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    /// `count` is member samples; `percentage` uses the distinct rounds.
    #[serde(flatten)]
    pub cluster: Cluster,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerClusterStats {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Qualifying rounds, the denominator of every cluster percentage.
    pub rounds: u32,
    pub clusters: Vec<ClusterStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPlayerClusters {
    pub map_id: MapId,
    pub players: Vec<PlayerClusterStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePostPlant {
    pub site: String,
    pub plants: u32,
    pub clusters: Vec<ClusterStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPostPlant {
    pub map_id: MapId,
    pub sites: Vec<SitePostPlant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLurkStats {
    pub player_id: PlayerId,
    pub player_name: String,
    pub attack_rounds: u32,
    pub lurk_rounds: u32,
    pub lurk_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLurkStats {
    pub map_id: MapId,
    pub attack_rounds: u32,
    pub lurk_rounds: u32,
    pub lurk_rate: f64,
    pub players: Vec<PlayerLurkStats>,
}
