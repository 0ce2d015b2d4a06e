//! Accumulator shared by both title state machines.
//!
//! The per-title `step` functions decide *which* transition an event drives;
//! this module owns *what* each transition does to the accumulator. The
//! accumulator is a plain value threaded through a left fold, so partial
//! event sequences can be fed and inspected directly.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use scout_core::{
    AbilityUsage, BombEvent, CoordinateSnapshot, GameRecord, Kill, MatchDocument, PlayerId,
    PlayerPosition, PlayerRef, PlayerStats, Point, Purchase, RosterEntry, RoundRecord, Side,
    TeamId, TeamInfo, Title, VetoAction, VetoKind, WinType,
};
use tracing::{debug, info, warn};

use super::inventory::purchased_items;
use super::stats::derive_player_stats;
use crate::wire::{GameState, SeriesState};

/// Latest known facts about a player, refreshed from every embedded state.
#[derive(Debug, Clone, Default)]
pub struct PlayerSighting {
    pub name: Option<String>,
    pub team_id: Option<TeamId>,
    pub character_id: Option<String>,
    pub position: Option<Point>,
    pub items: Vec<String>,
}

/// Per-round scratch, reset on every round-setup-start.
#[derive(Debug, Clone, Default)]
pub struct RoundScratch {
    pub provider_number: Option<u32>,
    pub team_sides: BTreeMap<TeamId, Side>,
    pub freezetime_ended_at: Option<DateTime<Utc>>,
    pub purchases: Vec<Purchase>,
    pub ability_usages: Vec<AbilityUsage>,
    pub kills: Vec<Kill>,
    pub bomb_plant: Option<BombEvent>,
    pub bomb_defuse: Option<BombEvent>,
    pub coordinate_tracking: Vec<CoordinateSnapshot>,
}

impl RoundScratch {
    fn push_snapshot(&mut self, snapshot: CoordinateSnapshot) {
        if snapshot.positions.is_empty() {
            return;
        }
        if self
            .coordinate_tracking
            .iter()
            .any(|s| s.timestamp == snapshot.timestamp)
        {
            return;
        }
        self.coordinate_tracking.push(snapshot);
    }
}

/// One game being reconstructed. Roster entries stay mutable until the game
/// is sealed into a [`GameRecord`].
#[derive(Debug, Clone, Default)]
pub struct GameAccumulator {
    pub game_number: u32,
    pub map_id: Option<String>,
    pub winner_team_id: Option<TeamId>,
    pub roster: Vec<RosterEntry>,
    pub rounds: Vec<RoundRecord>,
    pub round: Option<RoundScratch>,
    /// End-of-round inventories of the previous round, by player.
    pub baseline: HashMap<PlayerId, Vec<String>>,
}

impl GameAccumulator {
    fn seal(mut self) -> GameRecord {
        if let Some(open) = self.round.take() {
            if !open.kills.is_empty() || open.freezetime_ended_at.is_some() {
                debug!(game = self.game_number, "dropping unfinished round at game end");
            }
        }
        let mut record = GameRecord {
            game_number: self.game_number,
            map_id: self.map_id.unwrap_or_default(),
            winner_team_id: self.winner_team_id,
            players: self.roster,
            rounds: self.rounds,
        };
        derive_player_stats(&mut record);
        record
    }
}

/// Complete reconstruction state for one conversion call.
#[derive(Debug, Clone)]
pub struct ReconstructionState {
    pub title: Title,
    pub started_at: Option<DateTime<Utc>>,
    pub teams: Vec<TeamInfo>,
    pub game: Option<GameAccumulator>,
    pub games: Vec<GameRecord>,
    pub live: bool,
    pub in_combat: bool,
    pub veto: Vec<VetoAction>,
    pub sightings: HashMap<PlayerId, PlayerSighting>,
}

impl ReconstructionState {
    pub fn new(title: Title) -> Self {
        Self {
            title,
            started_at: None,
            teams: Vec::new(),
            game: None,
            games: Vec::new(),
            live: false,
            in_combat: false,
            veto: Vec::new(),
            sightings: HashMap::new(),
        }
    }

    pub fn note_time(&mut self, at: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(at);
        }
    }

    // ── Embedded state ──────────────────────────────────────────

    /// Refresh teams, sightings and the current roster from an embedded
    /// series snapshot. Runs before the event's own transition.
    pub fn absorb_state(&mut self, series: Option<&SeriesState>) {
        let Some(series) = series else {
            return;
        };

        for team in &series.teams {
            if !self.teams.iter().any(|t| t.id == team.id) {
                self.teams.push(TeamInfo {
                    id: team.id.clone(),
                    name: team.name.clone().unwrap_or_else(|| team.id.clone()),
                    players: Vec::new(),
                });
            }
        }

        let Some(game_state) = series.current_game() else {
            return;
        };

        for (team, player) in game_state.players() {
            let sighting = self.sightings.entry(player.id.clone()).or_default();
            if let Some(name) = &player.name {
                sighting.name = Some(name.clone());
            }
            sighting.team_id = Some(team.id.clone());
            if let Some(character) = player.character_id() {
                sighting.character_id = Some(character.to_string());
            }
            if let Some(pos) = player.position {
                sighting.position = Some(Point::new(pos.x, pos.y));
            }
            if player.inventory.is_some() {
                sighting.items = player.item_ids();
            }

            let idx = match self.teams.iter().position(|t| t.id == team.id) {
                Some(idx) => idx,
                None => {
                    self.teams.push(TeamInfo {
                        id: team.id.clone(),
                        name: team.name.clone().unwrap_or_else(|| team.id.clone()),
                        players: Vec::new(),
                    });
                    self.teams.len() - 1
                }
            };
            let team_info = &mut self.teams[idx];
            if !team_info.players.iter().any(|p| p.id == player.id) {
                team_info.players.push(PlayerRef {
                    id: player.id.clone(),
                    name: player.name.clone().unwrap_or_else(|| player.id.clone()),
                });
            }
        }

        if let Some(game) = self.game.as_mut() {
            backfill_roster(game, game_state);
        }
    }

    /// Append a coordinate snapshot when live and in combat.
    pub fn track_positions(&mut self, at: DateTime<Utc>, series: Option<&SeriesState>) {
        if !(self.live && self.in_combat) {
            return;
        }
        let Some(series) = series else {
            return;
        };
        let snapshot = snapshot_from(at, series.current_game());
        if let Some(round) = self.game.as_mut().and_then(|g| g.round.as_mut()) {
            round.push_snapshot(snapshot);
        }
    }

    // ── Game boundaries ─────────────────────────────────────────

    /// Match-boundary-start: flush the previous game and open a new one.
    pub fn start_game(&mut self, series: Option<&SeriesState>) {
        self.flush_game();
        let game_state = series.and_then(SeriesState::current_game);
        self.open_game(game_state);
    }

    fn open_game(&mut self, game_state: Option<&GameState>) {
        let last_number = self.games.last().map(|g| g.game_number).unwrap_or(0);
        let game_number = game_state
            .and_then(|g| g.sequence_number)
            .filter(|n| *n > last_number)
            .unwrap_or(last_number + 1);

        let mut game = GameAccumulator {
            game_number,
            map_id: game_state.and_then(GameState::map_id).map(str::to_string),
            ..GameAccumulator::default()
        };
        if let Some(gs) = game_state {
            backfill_roster(&mut game, gs);
        }

        info!(
            game = game_number,
            map = game.map_id.as_deref().unwrap_or("?"),
            players = game.roster.len(),
            "game started"
        );
        self.game = Some(game);
    }

    fn ensure_game(&mut self, series: Option<&SeriesState>) {
        if self.game.is_none() {
            debug!("round before any game start, opening game lazily");
            self.open_game(series.and_then(SeriesState::current_game));
        }
    }

    /// Seal the current game (if any) into the output list.
    pub fn flush_game(&mut self) {
        if let Some(game) = self.game.take() {
            let record = game.seal();
            info!(
                game = record.game_number,
                rounds = record.rounds.len(),
                winner = record.winner_team_id.as_deref().unwrap_or("?"),
                "game sealed"
            );
            self.games.push(record);
        }
        self.live = false;
        self.in_combat = false;
    }

    /// Match-clock-start. Position tracking only runs while live; sealing
    /// a game clears the flag.
    pub fn mark_live(&mut self) {
        self.live = true;
    }

    /// Match-won.
    pub fn win_game(&mut self, team_id: &str) {
        if let Some(game) = self.game.as_mut() {
            game.winner_team_id = Some(team_id.to_string());
        }
    }

    // ── Round phases ────────────────────────────────────────────

    /// Round-setup-start: reset scratch, capture sides and an initial snapshot.
    pub fn start_round(
        &mut self,
        at: DateTime<Utc>,
        series: Option<&SeriesState>,
        provider_number: Option<u32>,
    ) {
        self.ensure_game(series);
        let game_state = series.and_then(SeriesState::current_game);
        let initial = snapshot_from(at, game_state);
        let Some(game) = self.game.as_mut() else {
            return;
        };

        if game.round.is_some() {
            warn!(
                game = game.game_number,
                "round setup started while previous round still open, sealing it without winner"
            );
            seal_round(game, None);
        }

        let mut scratch = RoundScratch {
            provider_number,
            ..RoundScratch::default()
        };
        if let Some(gs) = game_state {
            for team in &gs.teams {
                if let Some(side) = team.side.as_deref().and_then(Side::from_provider) {
                    scratch.team_sides.insert(team.id.clone(), side);
                }
            }
        }
        scratch.push_snapshot(initial);
        game.round = Some(scratch);

        self.in_combat = false;
    }

    /// Round-setup-end: derive purchases and open combat.
    pub fn end_freezetime(&mut self, at: DateTime<Utc>, series: Option<&SeriesState>) {
        let current = self.inventories(series);
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let Some(round) = game.round.as_mut() else {
            return;
        };

        let mut purchases = Vec::new();
        for entry in &game.roster {
            let Some(items) = current.get(&entry.id) else {
                continue;
            };
            let baseline = game.baseline.get(&entry.id).map(Vec::as_slice).unwrap_or(&[]);
            for item_id in purchased_items(baseline, items) {
                purchases.push(Purchase {
                    player_id: entry.id.clone(),
                    player_name: entry.name.clone(),
                    team_id: Some(entry.team_id.clone()),
                    item_id,
                });
            }
        }
        round.purchases = purchases;
        round.freezetime_ended_at = Some(at);
        self.in_combat = true;
    }

    /// Round-ended: current inventories become the baseline for the next round.
    pub fn end_round(&mut self, series: Option<&SeriesState>) {
        let current = self.inventories(series);
        if let Some(game) = self.game.as_mut() {
            game.baseline = current;
        }
    }

    /// Round-won: seal the open round.
    pub fn win_round(&mut self, team_id: &str) {
        if let Some(game) = self.game.as_mut() {
            if game.round.is_some() {
                seal_round(game, Some(team_id.to_string()));
            } else {
                debug!(team = team_id, "round win without open round ignored");
            }
        }
        self.in_combat = false;
    }

    // ── Combat facts ────────────────────────────────────────────

    fn combat_round(&mut self) -> Option<&mut RoundScratch> {
        if !self.in_combat {
            return None;
        }
        self.game.as_mut().and_then(|g| g.round.as_mut())
    }

    pub fn record_kill(
        &mut self,
        at: DateTime<Utc>,
        killer_id: Option<&str>,
        victim_id: &str,
        weapon: Option<&str>,
    ) {
        let killer = killer_id.map(|id| self.sighting(id));
        let victim = self.sighting(victim_id);
        let Some(round) = self.combat_round() else {
            return;
        };
        round.kills.push(Kill {
            timestamp: at,
            killer_id: killer_id.map(str::to_string),
            killer_name: killer.as_ref().and_then(|s| s.name.clone()),
            killer_team_id: killer.as_ref().and_then(|s| s.team_id.clone()),
            victim_id: victim_id.to_string(),
            victim_name: victim.name,
            victim_team_id: victim.team_id,
            weapon: weapon.map(str::to_string),
            killer_position: killer.and_then(|s| s.position),
            victim_position: victim.position,
        });
    }

    pub fn record_ability(&mut self, at: DateTime<Utc>, player_id: &str, ability_id: &str) {
        let player = self.sighting(player_id);
        let character = self
            .game
            .as_ref()
            .and_then(|g| g.roster.iter().find(|p| p.id == player_id))
            .and_then(|p| p.character_id.clone())
            .or(player.character_id);
        let Some(round) = self.combat_round() else {
            return;
        };
        round.ability_usages.push(AbilityUsage {
            timestamp: at,
            player_id: player_id.to_string(),
            player_name: player.name,
            team_id: player.team_id,
            character_id: character,
            ability_id: ability_id.to_string(),
            position: player.position,
        });
    }

    pub fn record_plant(&mut self, at: DateTime<Utc>, player_id: Option<&str>, site: Option<&str>) {
        let event = self.bomb_event(at, player_id, site);
        if let Some(round) = self.combat_round() {
            round.bomb_plant = Some(event);
        }
    }

    pub fn record_defuse(&mut self, at: DateTime<Utc>, player_id: Option<&str>) {
        let event = self.bomb_event(at, player_id, None);
        if let Some(round) = self.combat_round() {
            round.bomb_defuse = Some(event);
        }
    }

    fn bomb_event(&self, at: DateTime<Utc>, player_id: Option<&str>, site: Option<&str>) -> BombEvent {
        let player = player_id.map(|id| self.sighting(id)).unwrap_or_default();
        BombEvent {
            timestamp: at,
            player_id: player_id.map(str::to_string),
            player_name: player.name,
            team_id: player.team_id,
            position: player.position,
            site: site.map(str::to_string),
        }
    }

    // ── Veto ────────────────────────────────────────────────────

    pub fn record_veto(
        &mut self,
        at: DateTime<Utc>,
        action: VetoKind,
        map_id: &str,
        team_id: Option<&str>,
    ) {
        self.veto.push(VetoAction {
            sequence_number: 0,
            action,
            map_id: map_id.to_string(),
            team_id: team_id.map(str::to_string),
            occurred_at: at,
        });
    }

    // ── Output ──────────────────────────────────────────────────

    /// End of stream: flush and build the match document.
    pub fn finish(mut self, match_id: &str) -> MatchDocument {
        self.flush_game();

        let map_veto = match self.title {
            Title::Valorant => {
                self.veto.sort_by_key(|v| v.occurred_at);
                for (idx, action) in self.veto.iter_mut().enumerate() {
                    action.sequence_number = idx as u32 + 1;
                }
                Some(self.veto)
            }
            Title::Cs2 => None,
        };

        MatchDocument {
            match_id: match_id.to_string(),
            title: self.title,
            started_at: self.started_at,
            teams: self.teams,
            games: self.games,
            map_veto,
        }
    }

    fn sighting(&self, player_id: &str) -> PlayerSighting {
        self.sightings.get(player_id).cloned().unwrap_or_default()
    }

    /// Inventories of roster players: embedded state first, else last sighting.
    fn inventories(&self, series: Option<&SeriesState>) -> HashMap<PlayerId, Vec<String>> {
        let mut out = HashMap::new();
        let Some(game) = self.game.as_ref() else {
            return out;
        };
        let game_state = series.and_then(SeriesState::current_game);
        for entry in &game.roster {
            let from_state = game_state.and_then(|gs| {
                gs.players()
                    .find(|(_, p)| p.id == entry.id && p.inventory.is_some())
                    .map(|(_, p)| p.item_ids())
            });
            let items = from_state.or_else(|| {
                self.sightings.get(&entry.id).map(|s| s.items.clone())
            });
            if let Some(items) = items {
                out.insert(entry.id.clone(), items);
            }
        }
        out
    }
}

/// Add missing roster entries and fill in missing characters / map.
fn backfill_roster(game: &mut GameAccumulator, game_state: &GameState) {
    if game.map_id.is_none() {
        game.map_id = game_state.map_id().map(str::to_string);
    }
    for (team, player) in game_state.players() {
        match game.roster.iter_mut().find(|p| p.id == player.id) {
            Some(entry) => {
                if entry.character_id.is_none() {
                    entry.character_id = player.character_id().map(str::to_string);
                }
            }
            None => game.roster.push(RosterEntry {
                id: player.id.clone(),
                name: player.name.clone().unwrap_or_else(|| player.id.clone()),
                team_id: team.id.clone(),
                character_id: player.character_id().map(str::to_string),
                stats: PlayerStats::default(),
            }),
        }
    }
}

fn snapshot_from(at: DateTime<Utc>, game_state: Option<&GameState>) -> CoordinateSnapshot {
    let positions = game_state
        .map(|gs| {
            gs.players()
                .filter_map(|(_, p)| {
                    p.position.map(|pos| PlayerPosition {
                        player_id: p.id.clone(),
                        x: pos.x,
                        y: pos.y,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    CoordinateSnapshot {
        timestamp: at,
        positions,
    }
}

/// Move the open round into the game's sealed list.
fn seal_round(game: &mut GameAccumulator, winner: Option<TeamId>) {
    let Some(scratch) = game.round.take() else {
        return;
    };
    let round_number = game.rounds.len() as u32 + 1;
    if let Some(provided) = scratch.provider_number {
        if provided != round_number {
            debug!(
                game = game.game_number,
                provided, assigned = round_number, "provider round number differs"
            );
        }
    }

    let win_type = winner
        .as_deref()
        .map(|w| derive_win_type(game, &scratch, w));

    let mut coordinate_tracking = scratch.coordinate_tracking;
    coordinate_tracking.sort_by_key(|s| s.timestamp);

    game.rounds.push(RoundRecord {
        round_number,
        winner_team_id: winner,
        win_type,
        team_sides: scratch.team_sides,
        freezetime_ended_at: scratch.freezetime_ended_at,
        purchases: scratch.purchases,
        ability_usages: scratch.ability_usages,
        kills: scratch.kills,
        bomb_plant: scratch.bomb_plant,
        bomb_defuse: scratch.bomb_defuse,
        coordinate_tracking,
    });
}

fn derive_win_type(game: &GameAccumulator, round: &RoundScratch, winner: &str) -> WinType {
    if round.bomb_defuse.is_some() {
        return WinType::Defuse;
    }
    let winner_side = round.team_sides.get(winner).copied();
    if round.bomb_plant.is_some() && winner_side == Some(Side::Attacker) {
        return WinType::Detonate;
    }

    let losers: Vec<&RosterEntry> = game
        .roster
        .iter()
        .filter(|p| p.team_id != winner)
        .collect();
    let all_dead = !losers.is_empty()
        && losers
            .iter()
            .all(|p| round.kills.iter().any(|k| k.victim_id == p.id));
    if all_dead {
        WinType::Elimination
    } else {
        WinType::Time
    }
}
