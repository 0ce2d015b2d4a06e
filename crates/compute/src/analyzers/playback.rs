//! Raw per-round data for replay views. Never aggregated.

use chrono::{DateTime, Utc};
use scout_core::{BombEvent, CoordinateSnapshot, Kill, MapId, MatchDocument, Side, TeamId};
use serde::{Deserialize, Serialize};

use super::common::team_games;
use super::{AnalysisContext, Analyzer, AnalyzerPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPayload {
    pub games: Vec<PlaybackGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackGame {
    pub game_number: u32,
    pub map_id: MapId,
    pub rounds: Vec<PlaybackRound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRound {
    pub round_number: u32,
    pub side: Option<Side>,
    pub winner_team_id: Option<TeamId>,
    pub freezetime_ended_at: Option<DateTime<Utc>>,
    pub coordinate_tracking: Vec<CoordinateSnapshot>,
    pub kills: Vec<Kill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bomb_plant: Option<BombEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bomb_defuse: Option<BombEvent>,
}

pub struct PlaybackAnalyzer;

impl Analyzer for PlaybackAnalyzer {
    fn name(&self) -> &'static str {
        "playback"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        _ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let games: Vec<PlaybackGame> = team_games(doc, team_id)
            .filter(|g| !g.rounds.is_empty())
            .map(|game| PlaybackGame {
                game_number: game.game_number,
                map_id: game.map_id.clone(),
                rounds: game
                    .rounds
                    .iter()
                    .map(|round| PlaybackRound {
                        round_number: round.round_number,
                        side: round.side_of(team_id),
                        winner_team_id: round.winner_team_id.clone(),
                        freezetime_ended_at: round.freezetime_ended_at,
                        coordinate_tracking: round.coordinate_tracking.clone(),
                        kills: round.kills.clone(),
                        bomb_plant: round.bomb_plant.clone(),
                        bomb_defuse: round.bomb_defuse.clone(),
                    })
                    .collect(),
            })
            .collect();

        if games.is_empty() {
            return None;
        }
        Some(AnalyzerPayload::Playback(PlaybackPayload { games }))
    }
}

#[cfg(test)]
mod tests {
    use scout_core::{CalloutTable, Title};

    use super::*;
    use crate::analyzers::common::fixtures::*;

    #[test]
    fn rounds_carry_team_side() {
        let rounds = vec![
            round(1, "t1", Side::Attacker, Some("t1")),
            round(2, "t1", Side::Defender, Some("t2")),
        ];
        let doc = document(
            Title::Valorant,
            vec![game(1, "ascent", 2, rounds), game(2, "bind", 2, vec![])],
        );
        let table = CalloutTable::default();

        let Some(AnalyzerPayload::Playback(payload)) =
            PlaybackAnalyzer.analyze(&doc, "t1", &AnalysisContext::new(&table))
        else {
            panic!("expected playback payload");
        };
        assert_eq!(payload.games.len(), 1);
        let sides: Vec<Option<Side>> = payload.games[0].rounds.iter().map(|r| r.side).collect();
        assert_eq!(sides, vec![Some(Side::Attacker), Some(Side::Defender)]);
    }
}
