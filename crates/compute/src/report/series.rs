use chrono::{DateTime, Utc};
use scout_core::{MapId, MatchDocument, RosterEntry, TeamId, VetoAction};
use serde::{Deserialize, Serialize};

use crate::analyzers::common::team_games;
use crate::analyzers::AnalyzerResult;

/// One match's analyzer results for the scouted team, ready to aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAnalysis {
    pub match_id: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub opponent: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub results: Vec<AnalyzerResult>,
    pub breakdown: SeriesBreakdown,
}

impl SeriesAnalysis {
    pub fn new(doc: &MatchDocument, team_id: &str, results: Vec<AnalyzerResult>) -> Self {
        let breakdown = SeriesBreakdown::from_document(doc, team_id);
        Self {
            match_id: doc.match_id.clone(),
            team_id: team_id.to_string(),
            team_name: doc
                .team(team_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| team_id.to_string()),
            opponent: breakdown.opponent.clone(),
            date: doc.started_at,
            results,
            breakdown,
        }
    }
}

/// Drill-down detail for one match, kept verbatim in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesBreakdown {
    pub match_id: String,
    pub opponent: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub veto: Vec<VetoAction>,
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_number: u32,
    pub map_id: MapId,
    pub won: bool,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub players: Vec<RosterEntry>,
}

impl SeriesBreakdown {
    pub fn from_document(doc: &MatchDocument, team_id: &str) -> Self {
        let games = team_games(doc, team_id)
            .map(|game| {
                let decided = game.rounds.iter().filter(|r| r.winner_team_id.is_some());
                let rounds_won = decided
                    .clone()
                    .filter(|r| r.winner_team_id.as_deref() == Some(team_id))
                    .count() as u32;
                let rounds_lost = decided.count() as u32 - rounds_won;
                GameSummary {
                    game_number: game.game_number,
                    map_id: game.map_id.clone(),
                    won: game.winner_team_id.as_deref() == Some(team_id),
                    rounds_won,
                    rounds_lost,
                    players: game.team_players(team_id).cloned().collect(),
                }
            })
            .collect();

        Self {
            match_id: doc.match_id.clone(),
            opponent: doc.opponent_of(team_id).map(|t| t.name.clone()),
            date: doc.started_at,
            veto: doc.map_veto.clone().unwrap_or_default(),
            games,
        }
    }
}
