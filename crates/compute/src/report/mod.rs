//! Cross-series aggregation into one scouting report per team.

pub mod accumulator;
pub mod series;
pub mod types;

use chrono::{DateTime, Utc};
use tracing::info;

pub use accumulator::{percentage, ReportAccumulator};
pub use series::{GameSummary, SeriesAnalysis, SeriesBreakdown};
pub use types::*;

/// Merge many matches' results for `team_id` into one report.
///
/// Numeric sections do not depend on the order of `series`; the series
/// breakdown keeps input order.
pub fn build_report(
    team_id: &str,
    series: &[SeriesAnalysis],
    generated_at: DateTime<Utc>,
) -> ScoutingReport {
    let mut acc = ReportAccumulator::new();
    for s in series {
        acc.absorb(s);
    }
    let breakdown = series.iter().map(|s| s.breakdown.clone()).collect();
    let report = acc.finish(team_id, breakdown, generated_at);
    info!(
        team = team_id,
        series = report.series_analyzed,
        maps = report.maps_played,
        "scouting report built"
    );
    report
}
