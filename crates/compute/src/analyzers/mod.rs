//! Stateless pattern analyzers over one reconstructed match.
//!
//! Every analyzer looks at a single [`MatchDocument`] from the point of view
//! of one team and yields a typed payload, or `None` when the match has no
//! qualifying rounds. Payloads keep raw counts so the report aggregator can
//! merge them across matches without re-weighting.

pub mod abilities;
pub mod agents;
pub mod common;
pub mod formations;
pub mod lurk;
pub mod maps;
pub mod playback;
pub mod positions;
pub mod post_plant;
pub mod veto;

use std::time::Instant;

use chrono::{DateTime, Utc};
use scout_core::{CalloutTable, MatchDocument};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use abilities::{AbilityHotspotAnalyzer, AbilityPayload};
pub use agents::{AgentPayload, AgentsAnalyzer};
pub use formations::{
    DefensiveFormationAnalyzer, EconomyFormationAnalyzer, EconomyPayload, FormationCounts,
    FormationPayload, OffensiveFormationAnalyzer,
};
pub use lurk::{LurkAnalyzer, LurkPayload};
pub use maps::{MapsAnalyzer, MapsPayload};
pub use playback::{PlaybackAnalyzer, PlaybackPayload};
pub use positions::{PlayerClusters, PlayerPositionAnalyzer, PositionPayload};
pub use post_plant::{PostPlantAnalyzer, PostPlantPayload};
pub use veto::{VetoAnalyzer, VetoPayload};

/// Read-only inputs shared by every analyzer call.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub callouts: &'a CalloutTable,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(callouts: &'a CalloutTable) -> Self {
        Self { callouts }
    }
}

/// A single pattern extractor.
///
/// Implementations hold no state between calls and may run concurrently.
pub trait Analyzer: Send + Sync {
    /// Catalogue name, also the payload tag.
    fn name(&self) -> &'static str;

    /// Analyze `doc` for `team_id`; `None` when nothing qualifies.
    fn analyze(
        &self,
        doc: &MatchDocument,
        team_id: &str,
        ctx: &AnalysisContext<'_>,
    ) -> Option<AnalyzerPayload>;
}

/// Typed analyzer output, tagged by analyzer name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analyzer", content = "data", rename_all = "snake_case")]
pub enum AnalyzerPayload {
    Veto(VetoPayload),
    Maps(MapsPayload),
    Agents(AgentPayload),
    DefensiveFormations(FormationPayload),
    OffensiveFormations(FormationPayload),
    EconomyFormations(EconomyPayload),
    PlayerPositions(PositionPayload),
    AbilityHotspots(AbilityPayload),
    PostPlant(PostPlantPayload),
    Lurk(LurkPayload),
    Playback(PlaybackPayload),
}

/// One analyzer's output for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerResult {
    pub name: String,
    pub payload: AnalyzerPayload,
    pub generated_at: DateTime<Utc>,
}

/// The full analyzer catalogue in report order.
pub fn default_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(VetoAnalyzer),
        Box::new(MapsAnalyzer),
        Box::new(AgentsAnalyzer),
        Box::new(DefensiveFormationAnalyzer),
        Box::new(OffensiveFormationAnalyzer),
        Box::new(EconomyFormationAnalyzer),
        Box::new(PlayerPositionAnalyzer),
        Box::new(AbilityHotspotAnalyzer),
        Box::new(PostPlantAnalyzer),
        Box::new(LurkAnalyzer),
        Box::new(PlaybackAnalyzer),
    ]
}

/// Run every analyzer against one match, skipping those with nothing to say.
pub fn run_analyzers(
    analyzers: &[Box<dyn Analyzer>],
    doc: &MatchDocument,
    team_id: &str,
    ctx: &AnalysisContext<'_>,
) -> Vec<AnalyzerResult> {
    let mut results = Vec::with_capacity(analyzers.len());
    for analyzer in analyzers {
        let start = Instant::now();
        let payload = analyzer.analyze(doc, team_id, ctx);
        debug!(
            analyzer = analyzer.name(),
            match_id = %doc.match_id,
            team = team_id,
            produced = payload.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "analyzer finished"
        );
        if let Some(payload) = payload {
            results.push(AnalyzerResult {
                name: analyzer.name().to_string(),
                payload,
                generated_at: Utc::now(),
            });
        }
    }
    results
}
