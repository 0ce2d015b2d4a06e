use std::collections::BTreeMap;

use scout_core::{MapId, MatchDocument, PlayerId};
use serde::{Deserialize, Serialize};

use super::common::team_games;
use super::{AnalysisContext, Analyzer, AnalyzerPayload};

/// Character selections per player for one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    pub players: BTreeMap<PlayerId, PlayerAgents>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAgents {
    pub name: String,
    pub picks: Vec<AgentPick>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPick {
    pub map_id: MapId,
    pub character_id: String,
}

pub struct AgentsAnalyzer;

impl Analyzer for AgentsAnalyzer {
    fn name(&self) -> &'static str {
        "agents"
    }

    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        _ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload> {
        let mut payload = AgentPayload::default();
        for game in team_games(doc, team_id) {
            for player in game.team_players(team_id) {
                let Some(character) = &player.character_id else {
                    continue;
                };
                let entry = payload
                    .players
                    .entry(player.id.clone())
                    .or_insert_with(|| PlayerAgents {
                        name: player.name.clone(),
                        picks: Vec::new(),
                    });
                entry.picks.push(AgentPick {
                    map_id: game.map_id.clone(),
                    character_id: character.clone(),
                });
            }
        }
        if payload.players.is_empty() {
            return None;
        }
        Some(AnalyzerPayload::Agents(payload))
    }
}
