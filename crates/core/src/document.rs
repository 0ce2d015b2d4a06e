//! Reconstructed match document: Series → Games → Rounds.
//!
//! This is the frozen output contract of the reconstructors. Everything is
//! serialized camelCase; optional facts are omitted when absent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{MapId, PlayerId, Side, TeamId, Title, VetoKind, WinType};
use crate::geometry::Point;

/// One reconstructed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDocument {
    pub match_id: String,
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub teams: Vec<TeamInfo>,
    pub games: Vec<GameRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_veto: Option<Vec<VetoAction>>,
}

impl MatchDocument {
    pub fn empty(match_id: impl Into<String>, title: Title) -> Self {
        Self {
            match_id: match_id.into(),
            title,
            started_at: None,
            teams: Vec::new(),
            games: Vec::new(),
            map_veto: None,
        }
    }

    pub fn team(&self, team_id: &str) -> Option<&TeamInfo> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// The first team that is not `team_id`.
    pub fn opponent_of(&self, team_id: &str) -> Option<&TeamInfo> {
        self.teams.iter().find(|t| t.id != team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<PlayerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

/// One map played within the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game_number: u32,
    pub map_id: MapId,
    pub winner_team_id: Option<TeamId>,
    pub players: Vec<RosterEntry>,
    pub rounds: Vec<RoundRecord>,
}

impl GameRecord {
    pub fn player(&self, player_id: &str) -> Option<&RosterEntry> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn team_players<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a RosterEntry> {
        self.players.iter().filter(move |p| p.team_id == team_id)
    }

    /// Previous round of `round`, if any (rounds are contiguous from 1).
    pub fn previous_round(&self, round: &RoundRecord) -> Option<&RoundRecord> {
        let idx = round.round_number.checked_sub(2)? as usize;
        self.rounds.get(idx)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    pub character_id: Option<String>,
    pub stats: PlayerStats,
}

/// Per-player totals derived from a game's kill facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub kills: u32,
    pub deaths: u32,
    pub attacker_kills: u32,
    pub attacker_deaths: u32,
    pub defender_kills: u32,
    pub defender_deaths: u32,
    pub first_kills: u32,
    pub first_deaths: u32,
}

/// One sealed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round_number: u32,
    pub winner_team_id: Option<TeamId>,
    pub win_type: Option<WinType>,
    pub team_sides: BTreeMap<TeamId, Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freezetime_ended_at: Option<DateTime<Utc>>,
    pub purchases: Vec<Purchase>,
    pub ability_usages: Vec<AbilityUsage>,
    pub kills: Vec<Kill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_plant: Option<BombEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_defuse: Option<BombEvent>,
    pub coordinate_tracking: Vec<CoordinateSnapshot>,
}

impl RoundRecord {
    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        self.team_sides.get(team_id).copied()
    }

    /// Team holding `side` this round.
    pub fn team_on(&self, side: Side) -> Option<&str> {
        self.team_sides
            .iter()
            .find(|(_, s)| **s == side)
            .map(|(team, _)| team.as_str())
    }

    /// Time of the player's first death this round.
    pub fn death_time(&self, player_id: &str) -> Option<DateTime<Utc>> {
        self.kills
            .iter()
            .filter(|k| k.victim_id == player_id)
            .map(|k| k.timestamp)
            .min()
    }

    /// Whether the player was alive at `instant` (killed strictly before means dead).
    pub fn alive_at(&self, player_id: &str, instant: DateTime<Utc>) -> bool {
        match self.death_time(player_id) {
            Some(died) => died >= instant,
            None => true,
        }
    }

    /// First snapshot with `timestamp >= instant`.
    pub fn snapshot_at_or_after(&self, instant: DateTime<Utc>) -> Option<&CoordinateSnapshot> {
        self.coordinate_tracking
            .iter()
            .find(|s| s.timestamp >= instant)
    }

    /// Snapshot whose timestamp is closest to `instant`; earlier snapshot wins ties.
    pub fn snapshot_closest_to(&self, instant: DateTime<Utc>) -> Option<&CoordinateSnapshot> {
        self.coordinate_tracking.iter().min_by_key(|s| {
            (s.timestamp - instant).num_milliseconds().unsigned_abs()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: Option<TeamId>,
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kill {
    pub timestamp: DateTime<Utc>,
    pub killer_id: Option<PlayerId>,
    pub killer_name: Option<String>,
    pub killer_team_id: Option<TeamId>,
    pub victim_id: PlayerId,
    pub victim_name: Option<String>,
    pub victim_team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim_position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityUsage {
    pub timestamp: DateTime<Utc>,
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    pub team_id: Option<TeamId>,
    pub character_id: Option<String>,
    pub ability_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombEvent {
    pub timestamp: DateTime<Utc>,
    pub player_id: Option<PlayerId>,
    pub player_name: Option<String>,
    pub team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

/// All players' positions at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSnapshot {
    pub timestamp: DateTime<Utc>,
    pub positions: Vec<PlayerPosition>,
}

impl CoordinateSnapshot {
    pub fn position_of(&self, player_id: &str) -> Option<Point> {
        self.positions
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| Point::new(p.x, p.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPosition {
    pub player_id: PlayerId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoAction {
    pub sequence_number: u32,
    pub action: VetoKind,
    pub map_id: MapId,
    pub team_id: Option<TeamId>,
    pub occurred_at: DateTime<Utc>,
}
