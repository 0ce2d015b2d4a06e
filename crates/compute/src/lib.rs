//! Spatial clustering, per-match pattern analyzers and the cross-series
//! report aggregator.

pub mod algorithms;
pub mod analyzers;
pub mod engine;
pub mod report;

pub use analyzers::{
    default_analyzers, run_analyzers, AnalysisContext, Analyzer, AnalyzerPayload, AnalyzerResult,
};
pub use engine::ScoutEngine;
pub use report::{build_report, ReportAccumulator, ScoutingReport, SeriesAnalysis};
