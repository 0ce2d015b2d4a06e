//! Counter-Strike 2 state machine.
//!
//! CS2 logs have no veto and no agents. Utility throws stand in for ability
//! usage, and the clock may be resumed after a tactical pause, which also
//! counts as going live.

use scout_core::{MatchDocument, Title};
use tracing::debug;

use crate::reconstruct::ReconstructionState;
use crate::wire::{EventBatch, RawEvent};

#[derive(Debug, Clone, Copy)]
pub enum Cs2Event<'a> {
    GameStarted,
    ClockStarted,
    ClockResumed,
    FreezetimeStarted { round: Option<u32> },
    FreezetimeEnded,
    UtilityThrown { player_id: &'a str, item_id: &'a str },
    Kill { killer_id: Option<&'a str>, victim_id: &'a str, weapon: Option<&'a str> },
    BombPlanted { player_id: Option<&'a str>, site: Option<&'a str> },
    BombDefused { player_id: Option<&'a str> },
    RoundWon { team_id: &'a str },
    RoundEnded,
    GameWon { team_id: &'a str },
    Unrecognized { raw: &'a RawEvent },
}

impl<'a> Cs2Event<'a> {
    pub fn from_raw(raw: &'a RawEvent) -> Self {
        let unrecognized = Cs2Event::Unrecognized { raw };
        match raw.kind.as_str() {
            "series-started-game" => Cs2Event::GameStarted,
            "game-started-clock" => Cs2Event::ClockStarted,
            "game-resumed-clock" => Cs2Event::ClockResumed,
            "round-started-freezetime" => Cs2Event::FreezetimeStarted {
                round: raw.actor.as_ref().and_then(|a| a.u32_field("sequenceNumber")),
            },
            "round-ended-freezetime" => Cs2Event::FreezetimeEnded,
            "player-threw-item" => match (raw.actor_id(), raw.target_id()) {
                (Some(player_id), Some(item_id)) => Cs2Event::UtilityThrown { player_id, item_id },
                _ => unrecognized,
            },
            "player-killed-player" => match raw.target_id() {
                Some(victim_id) => Cs2Event::Kill {
                    killer_id: raw.actor_id(),
                    victim_id,
                    weapon: raw.actor.as_ref().and_then(|a| a.str_field("weapon")),
                },
                None => unrecognized,
            },
            "player-completed-plantBomb" => Cs2Event::BombPlanted {
                player_id: raw.actor_id(),
                site: raw.target.as_ref().and_then(|t| t.str_field("site")),
            },
            "player-completed-defuseBomb" => Cs2Event::BombDefused {
                player_id: raw.actor_id(),
            },
            "team-won-round" => match raw.actor_id() {
                Some(team_id) => Cs2Event::RoundWon { team_id },
                None => unrecognized,
            },
            "game-ended-round" => Cs2Event::RoundEnded,
            "team-won-game" => match raw.actor_id() {
                Some(team_id) => Cs2Event::GameWon { team_id },
                None => unrecognized,
            },
            _ => unrecognized,
        }
    }
}

pub fn step(mut state: ReconstructionState, batch: &EventBatch, raw: &RawEvent) -> ReconstructionState {
    let at = batch.occurred_at;
    let series = raw.series_state.as_ref();
    state.note_time(at);

    let event = Cs2Event::from_raw(raw);
    if matches!(event, Cs2Event::GameStarted) {
        // The embedded state already describes the new game.
        state.flush_game();
    }
    state.absorb_state(series);

    match event {
        Cs2Event::GameStarted => state.start_game(series),
        Cs2Event::ClockStarted | Cs2Event::ClockResumed => state.mark_live(),
        Cs2Event::FreezetimeStarted { round } => state.start_round(at, series, round),
        Cs2Event::FreezetimeEnded => state.end_freezetime(at, series),
        Cs2Event::UtilityThrown { player_id, item_id } => {
            state.record_ability(at, player_id, item_id)
        }
        Cs2Event::Kill { killer_id, victim_id, weapon } => {
            state.record_kill(at, killer_id, victim_id, weapon)
        }
        Cs2Event::BombPlanted { player_id, site } => state.record_plant(at, player_id, site),
        Cs2Event::BombDefused { player_id } => state.record_defuse(at, player_id),
        Cs2Event::RoundWon { team_id } => state.win_round(team_id),
        Cs2Event::RoundEnded => state.end_round(series),
        Cs2Event::GameWon { team_id } => state.win_game(team_id),
        Cs2Event::Unrecognized { raw } => {
            debug!(kind = %raw.kind, "ignoring unrecognized cs2 event");
        }
    }

    state.track_positions(at, series);
    state
}

/// Fold a decoded CS2 log into a match document.
pub fn reconstruct(match_id: &str, batches: &[EventBatch]) -> MatchDocument {
    batches
        .iter()
        .flat_map(|batch| batch.events.iter().map(move |event| (batch, event)))
        .fold(ReconstructionState::new(Title::Cs2), |state, (batch, event)| {
            step(state, batch, event)
        })
        .finish(match_id)
}
