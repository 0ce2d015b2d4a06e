use std::collections::HashMap;

use scout_core::{GameRecord, PlayerStats, Side};
use tracing::debug;

/// Recompute every roster entry's stats from the game's kill facts.
///
/// Sides come from each round's side map, so a kill on round 14 is credited
/// to whichever side the killer's team held on round 14.
pub fn derive_player_stats(game: &mut GameRecord) {
    let team_of: HashMap<String, String> = game
        .players
        .iter()
        .map(|p| (p.id.clone(), p.team_id.clone()))
        .collect();
    let mut totals: HashMap<String, PlayerStats> = HashMap::new();
    let mut skipped = 0usize;

    for round in &game.rounds {
        for (idx, kill) in round.kills.iter().enumerate() {
            let first = idx == 0;

            if let Some(victim_team) = team_of.get(&kill.victim_id) {
                let stats = totals.entry(kill.victim_id.clone()).or_default();
                stats.deaths += 1;
                match round.side_of(victim_team) {
                    Some(Side::Attacker) => stats.attacker_deaths += 1,
                    Some(Side::Defender) => stats.defender_deaths += 1,
                    None => {}
                }
                if first {
                    stats.first_deaths += 1;
                }
            } else {
                skipped += 1;
            }

            let Some(killer_id) = kill.killer_id.as_deref() else {
                continue;
            };
            if killer_id == kill.victim_id {
                continue;
            }
            let Some(killer_team) = team_of.get(killer_id) else {
                skipped += 1;
                continue;
            };
            let stats = totals.entry(killer_id.to_string()).or_default();
            stats.kills += 1;
            match round.side_of(killer_team) {
                Some(Side::Attacker) => stats.attacker_kills += 1,
                Some(Side::Defender) => stats.defender_kills += 1,
                None => {}
            }
            if first {
                stats.first_kills += 1;
            }
        }
    }

    for player in &mut game.players {
        player.stats = totals.remove(&player.id).unwrap_or_default();
    }

    if skipped > 0 {
        debug!(
            game = game.game_number,
            skipped, "kill facts referencing unknown players left out of stats"
        );
    }
}
