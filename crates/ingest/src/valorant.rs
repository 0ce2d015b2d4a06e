//! Valorant state machine.
//!
//! Valorant logs carry the series map veto ahead of the first game, agent
//! identities on every player, and ability usage for every utility cast.

use scout_core::{MatchDocument, Title, VetoKind};
use tracing::debug;

use crate::reconstruct::ReconstructionState;
use crate::wire::{EventBatch, RawEvent};

/// Closed set of Valorant events the reconstructor acts on.
#[derive(Debug, Clone, Copy)]
pub enum ValorantEvent<'a> {
    GameStarted,
    ClockStarted,
    FreezetimeStarted { round: Option<u32> },
    FreezetimeEnded,
    AbilityUsed { player_id: &'a str, ability_id: &'a str },
    Kill { killer_id: Option<&'a str>, victim_id: &'a str, weapon: Option<&'a str> },
    BombPlanted { player_id: Option<&'a str>, site: Option<&'a str> },
    BombDefused { player_id: Option<&'a str> },
    RoundWon { team_id: &'a str },
    RoundEnded,
    GameWon { team_id: &'a str },
    MapBanned { team_id: &'a str, map_id: &'a str },
    MapPicked { team_id: &'a str, map_id: &'a str },
    DeciderPicked { map_id: &'a str },
    /// Unknown type tag, or a known tag missing a required id. Kept for logging only.
    Unrecognized { raw: &'a RawEvent },
}

impl<'a> ValorantEvent<'a> {
    pub fn from_raw(raw: &'a RawEvent) -> Self {
        let unrecognized = ValorantEvent::Unrecognized { raw };
        match raw.kind.as_str() {
            "series-started-game" => ValorantEvent::GameStarted,
            "game-started-clock" => ValorantEvent::ClockStarted,
            "round-started-freezetime" => ValorantEvent::FreezetimeStarted {
                round: raw.actor.as_ref().and_then(|a| a.u32_field("sequenceNumber")),
            },
            "round-ended-freezetime" => ValorantEvent::FreezetimeEnded,
            "player-used-ability" => match (raw.actor_id(), raw.target_id()) {
                (Some(player_id), Some(ability_id)) => {
                    ValorantEvent::AbilityUsed { player_id, ability_id }
                }
                _ => unrecognized,
            },
            "player-killed-player" => match raw.target_id() {
                Some(victim_id) => ValorantEvent::Kill {
                    killer_id: raw.actor_id(),
                    victim_id,
                    weapon: raw.actor.as_ref().and_then(|a| a.str_field("weapon")),
                },
                None => unrecognized,
            },
            "player-completed-plantBomb" => ValorantEvent::BombPlanted {
                player_id: raw.actor_id(),
                site: raw.target.as_ref().and_then(|t| t.str_field("site")),
            },
            "player-completed-defuseBomb" => ValorantEvent::BombDefused {
                player_id: raw.actor_id(),
            },
            "team-won-round" => match raw.actor_id() {
                Some(team_id) => ValorantEvent::RoundWon { team_id },
                None => unrecognized,
            },
            "game-ended-round" => ValorantEvent::RoundEnded,
            "team-won-game" => match raw.actor_id() {
                Some(team_id) => ValorantEvent::GameWon { team_id },
                None => unrecognized,
            },
            "team-banned-map" => match (raw.actor_id(), raw.target_id()) {
                (Some(team_id), Some(map_id)) => ValorantEvent::MapBanned { team_id, map_id },
                _ => unrecognized,
            },
            "team-picked-map" => match (raw.actor_id(), raw.target_id()) {
                (Some(team_id), Some(map_id)) => ValorantEvent::MapPicked { team_id, map_id },
                _ => unrecognized,
            },
            "series-picked-map" => match raw.target_id() {
                Some(map_id) => ValorantEvent::DeciderPicked { map_id },
                None => unrecognized,
            },
            _ => unrecognized,
        }
    }
}

/// One fold step: apply a single event to the accumulator.
pub fn step(mut state: ReconstructionState, batch: &EventBatch, raw: &RawEvent) -> ReconstructionState {
    let at = batch.occurred_at;
    let series = raw.series_state.as_ref();
    state.note_time(at);

    let event = ValorantEvent::from_raw(raw);
    if matches!(event, ValorantEvent::GameStarted) {
        // The embedded state already describes the new game.
        state.flush_game();
    }
    state.absorb_state(series);

    match event {
        ValorantEvent::GameStarted => state.start_game(series),
        ValorantEvent::ClockStarted => state.mark_live(),
        ValorantEvent::FreezetimeStarted { round } => state.start_round(at, series, round),
        ValorantEvent::FreezetimeEnded => state.end_freezetime(at, series),
        ValorantEvent::AbilityUsed { player_id, ability_id } => {
            state.record_ability(at, player_id, ability_id)
        }
        ValorantEvent::Kill { killer_id, victim_id, weapon } => {
            state.record_kill(at, killer_id, victim_id, weapon)
        }
        ValorantEvent::BombPlanted { player_id, site } => state.record_plant(at, player_id, site),
        ValorantEvent::BombDefused { player_id } => state.record_defuse(at, player_id),
        ValorantEvent::RoundWon { team_id } => state.win_round(team_id),
        ValorantEvent::RoundEnded => state.end_round(series),
        ValorantEvent::GameWon { team_id } => state.win_game(team_id),
        ValorantEvent::MapBanned { team_id, map_id } => {
            state.record_veto(at, VetoKind::Ban, map_id, Some(team_id))
        }
        ValorantEvent::MapPicked { team_id, map_id } => {
            state.record_veto(at, VetoKind::Pick, map_id, Some(team_id))
        }
        ValorantEvent::DeciderPicked { map_id } => {
            state.record_veto(at, VetoKind::Decider, map_id, None)
        }
        ValorantEvent::Unrecognized { raw } => {
            debug!(kind = %raw.kind, "ignoring unrecognized valorant event");
        }
    }

    state.track_positions(at, series);
    state
}

/// Fold a decoded Valorant log into a match document.
pub fn reconstruct(match_id: &str, batches: &[EventBatch]) -> MatchDocument {
    batches
        .iter()
        .flat_map(|batch| batch.events.iter().map(move |event| (batch, event)))
        .fold(ReconstructionState::new(Title::Valorant), |state, (batch, event)| {
            step(state, batch, event)
        })
        .finish(match_id)
}
