use scout_core::{MapId, MatchDocument};
use serde::{Deserialize, Serialize};

use super::common::team_games;
use super::{AnalysisContext, Analyzer, AnalyzerPayload};

/// Maps a team played in one match, and the ones it won.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsPayload {
    pub played: Vec<MapId>,
    pub won: Vec<MapId>,
}

pub struct MapsAnalyzer;

impl Analyzer for MapsAnalyzer {
    fn name(&self) -> &'static str {
        "maps"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        _ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut payload = MapsPayload::default();
        for game in team_games(doc, team_id) {
            payload.played.push(game.map_id.clone());
            if game.winner_team_id.as_deref() == Some(team_id) {
                payload.won.push(game.map_id.clone());
            }
        }
        if payload.played.is_empty() {
            return None;
        }
        Some(AnalyzerPayload::Maps(payload))
    }
}
