//! Formation analyzers.
//!
//! A formation is the per-super-region head count of a team's live players
//! at a fixed reference instant. Rounds are counted whenever the team held
//! the analyzed side and freezetime ended, whether or not a formation could
//! be read, so the round count is the denominator for every key.

use std::collections::BTreeMap;

use scout_core::{GameRecord, MapId, MatchDocument, Point, RoundRecord, Side};
use serde::{Deserialize, Serialize};

use super::common::{
    formation_key, is_high_value, live_teammates, reference_snapshot, rounds_on_side, team_games,
    DEFENSE_REFERENCE_SECS, HALF_START_ROUNDS, OFFENSE_REFERENCE_SECS,
};
use super::{AnalysisContext, Analyzer, AnalyzerPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationCounts {
    pub rounds: u32,
    pub formations: BTreeMap<String, u32>,
}

impl FormationCounts {
    pub fn add(&mut self, other: &FormationCounts) {
        self.rounds += other.rounds;
        for (key, count) in &other.formations {
            *self.formations.entry(key.clone()).or_default() += count;
        }
    }

    fn record(&mut self, key: Option<String>) {
        self.rounds += 1;
        if let Some(key) = key {
            *self.formations.entry(key).or_default() += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationPayload {
    pub maps: BTreeMap<MapId, FormationCounts>,
}

/// Defensive formations split by the team's economy that round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyPayload {
    pub maps: BTreeMap<MapId, EconomyCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyCounts {
    pub buy: FormationCounts,
    pub eco: FormationCounts,
}

impl EconomyCounts {
    pub fn add(&mut self, other: &EconomyCounts) {
        self.buy.add(&other.buy);
        self.eco.add(&other.eco);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomyClass {
    Buy,
    Eco,
}

pub struct DefensiveFormationAnalyzer;
pub struct OffensiveFormationAnalyzer;
pub struct EconomyFormationAnalyzer;

impl Analyzer for DefensiveFormationAnalyzer {
    fn name(&self) -> &'static str {
        "defensive_formations"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        side_formations(doc, team_id, ctx, Side::Defender, DEFENSE_REFERENCE_SECS)
            .map(AnalyzerPayload::DefensiveFormations)
    }
}

impl Analyzer for OffensiveFormationAnalyzer {
    fn name(&self) -> &'static str {
        "offensive_formations"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        side_formations(doc, team_id, ctx, Side::Attacker, OFFENSE_REFERENCE_SECS)
            .map(AnalyzerPayload::OffensiveFormations)
    }
}

impl Analyzer for EconomyFormationAnalyzer {
    fn name(&self) -> &'static str {
        "economy_formations"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut payload = EconomyPayload::default();
        for game in team_games(doc, team_id) {
            for round in rounds_on_side(game, team_id, Side::Defender) {
                if round.freezetime_ended_at.is_none()
                    || HALF_START_ROUNDS.contains(&round.round_number)
                {
                    continue;
                }
                let key = round_formation(ctx, game, round, team_id, DEFENSE_REFERENCE_SECS);
                let counts = payload.maps.entry(game.map_id.clone()).or_default();
                match classify_economy(doc, game, round, team_id) {
                    EconomyClass::Buy => counts.buy.record(key),
                    EconomyClass::Eco => counts.eco.record(key),
                }
            }
        }
        if payload.maps.is_empty() {
            return None;
        }
        Some(AnalyzerPayload::EconomyFormations(payload))
    }
}

fn side_formations(
    doc: &MatchDocument,
    team_id: &str,
    ctx: &AnalysisContext<'_>,
    side: Side,
    offset_secs: i64,
) -> Option<FormationPayload> {
    let mut payload = FormationPayload::default();
    for game in team_games(doc, team_id) {
        for round in rounds_on_side(game, team_id, side) {
            if round.freezetime_ended_at.is_none() {
                continue;
            }
            let key = round_formation(ctx, game, round, team_id, offset_secs);
            payload
                .maps
                .entry(game.map_id.clone())
                .or_default()
                .record(key);
        }
    }
    if payload.maps.is_empty() {
        return None;
    }
    Some(payload)
}

/// Formation key of the live teammates at the reference snapshot.
fn round_formation(
    ctx: &AnalysisContext<'_>,
    game: &GameRecord,
    round: &RoundRecord,
    team_id: &str,
    offset_secs: i64,
) -> Option<String> {
    let snapshot = reference_snapshot(round, offset_secs)?;
    let positions: Vec<Point> = live_teammates(game, round, team_id, snapshot)
        .into_iter()
        .map(|(_, pos)| pos)
        .collect();
    if positions.is_empty() {
        return None;
    }
    Some(formation_key(ctx, &game.map_id, &positions))
}

/// `Buy` when the team won the previous round or bought a full-buy weapon.
pub fn classify_economy(
    doc: &MatchDocument,
    game: &GameRecord,
    round: &RoundRecord,
    team_id: &str,
) -> EconomyClass {
    let won_previous = game
        .previous_round(round)
        .is_some_and(|prev| prev.winner_team_id.as_deref() == Some(team_id));
    let bought = round.purchases.iter().any(|p| {
        p.team_id.as_deref() == Some(team_id) && is_high_value(doc.title, &p.item_id)
    });
    if won_previous || bought {
        EconomyClass::Buy
    } else {
        EconomyClass::Eco
    }
}
