use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use scout_core::{CalloutTable, MatchDocument};
use tracing::info;

use crate::analyzers::{default_analyzers, run_analyzers, AnalysisContext, Analyzer};
use crate::report::{build_report, ScoutingReport, SeriesAnalysis};

/// Analyzer catalogue plus the callout table it reads, built once and
/// shared across matches.
pub struct ScoutEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
    callouts: CalloutTable,
}

impl ScoutEngine {
    /// Full catalogue over the given callout table.
    pub fn new(callouts: CalloutTable) -> Self {
        Self::with_analyzers(callouts, default_analyzers())
    }

    pub fn with_analyzers(callouts: CalloutTable, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self {
            analyzers,
            callouts,
        }
    }

    pub fn callouts(&self) -> &CalloutTable {
        &self.callouts
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Run every analyzer over one match for `team_id`.
    pub fn analyze(&self, doc: &MatchDocument, team_id: &str) -> SeriesAnalysis {
        let ctx = AnalysisContext::new(&self.callouts);
        let results = run_analyzers(&self.analyzers, doc, team_id, &ctx);
        SeriesAnalysis::new(doc, team_id, results)
    }

    /// Analyze every match in parallel, then merge into one report.
    ///
    /// Matches the team did not play are skipped.
    pub fn report(&self, docs: &[MatchDocument], team_id: &str) -> ScoutingReport {
        let start = Instant::now();

        info!("Analyzing {} matches for team {}...", docs.len(), team_id);
        let series: Vec<SeriesAnalysis> = docs
            .par_iter()
            .filter(|doc| doc.team(team_id).is_some())
            .map(|doc| self.analyze(doc, team_id))
            .collect();
        info!(
            "  Analysis done in {:.1}s ({} of {} matches involve the team)",
            start.elapsed().as_secs_f64(),
            series.len(),
            docs.len()
        );

        let merge_start = Instant::now();
        let report = build_report(team_id, &series, Utc::now());
        info!(
            "Report complete in {:.1}s (merge {:.3}s)",
            start.elapsed().as_secs_f64(),
            merge_start.elapsed().as_secs_f64()
        );
        report
    }
}
