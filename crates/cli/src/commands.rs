use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use scout_compute::ScoutEngine;
use scout_core::{CalloutTable, Config, MatchDocument, Title};
use scout_ingest::{decode_reader, reconstruct};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{read_document, write_document, MatchCache};

pub struct ConvertOptions {
    pub logs: Vec<PathBuf>,
    pub title: Option<Title>,
    pub match_id: Option<String>,
    pub out: Option<PathBuf>,
    pub force: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub converted: usize,
    pub cached: usize,
    pub failed: usize,
}

enum Outcome {
    Converted,
    Cached,
}

pub fn open_cache(config: &Config) -> Result<MatchCache> {
    let dir = &config.storage.match_cache_dir;
    MatchCache::open(dir).with_context(|| format!("failed to open match cache {}", dir.display()))
}

/// Callout table from the configured path; an absent file leaves every
/// position in the "Unknown" region.
pub fn load_engine(config: &Config) -> Result<ScoutEngine> {
    let path = &config.analysis.callouts_path;
    let callouts = if path.exists() {
        CalloutTable::load(path)
            .with_context(|| format!("failed to load callouts from {}", path.display()))?
    } else {
        warn!(path = %path.display(), "callout table not found, regions will be Unknown");
        CalloutTable::default()
    };
    Ok(ScoutEngine::new(callouts))
}

/// Convert logs in parallel. Logs whose match id is already cached are
/// skipped unless `force` is set.
pub fn convert(config: &Config, opts: &ConvertOptions) -> Result<ConvertSummary> {
    if opts.logs.len() > 1 && (opts.match_id.is_some() || opts.out.is_some()) {
        bail!("--match-id and --out need exactly one log");
    }
    let cache = open_cache(config)?;
    let title = opts.title.unwrap_or(config.analysis.default_title);
    let start = Instant::now();

    info!("Converting {} logs as {}...", opts.logs.len(), title);
    let outcomes: Vec<(&PathBuf, Result<Outcome>)> = opts
        .logs
        .par_iter()
        .map(|log| (log, convert_one(&cache, title, log, opts)))
        .collect();

    let mut summary = ConvertSummary::default();
    for (log, outcome) in outcomes {
        match outcome {
            Ok(Outcome::Converted) => summary.converted += 1,
            Ok(Outcome::Cached) => summary.cached += 1,
            Err(e) => {
                warn!(log = %log.display(), error = %format!("{e:#}"), "conversion failed");
                summary.failed += 1;
            }
        }
    }
    info!(
        "Convert complete in {:.1}s: {} converted, {} already cached, {} failed",
        start.elapsed().as_secs_f64(),
        summary.converted,
        summary.cached,
        summary.failed
    );
    if summary.failed > 0 {
        bail!("{} of {} logs failed to convert", summary.failed, opts.logs.len());
    }
    Ok(summary)
}

fn convert_one(
    cache: &MatchCache,
    title: Title,
    log: &Path,
    opts: &ConvertOptions,
) -> Result<Outcome> {
    let match_id = match &opts.match_id {
        Some(id) => id.clone(),
        None => match_id_from_path(log)?,
    };
    if !opts.force && cache.contains(&match_id) {
        info!(match_id = %match_id, "already cached, skipping");
        return Ok(Outcome::Cached);
    }

    let doc = convert_file(title, &match_id, log)?;
    cache
        .store(&doc)
        .with_context(|| format!("failed to cache match {match_id}"))?;
    if let Some(out) = &opts.out {
        write_document(out, &doc).with_context(|| format!("failed to write {}", out.display()))?;
    }
    Ok(Outcome::Converted)
}

/// Decode and reconstruct one log file.
pub fn convert_file(title: Title, match_id: &str, log: &Path) -> Result<MatchDocument> {
    let file = File::open(log).with_context(|| format!("failed to open {}", log.display()))?;
    let (batches, stats) = decode_reader(BufReader::new(file));
    let doc = reconstruct(title, match_id, &batches);
    info!(
        match_id,
        %title,
        lines = stats.lines_read,
        skipped = stats.lines_skipped,
        games = doc.games.len(),
        "log converted"
    );
    Ok(doc)
}

fn match_id_from_path(log: &Path) -> Result<String> {
    log.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a match id from {}", log.display()))
}

/// A document argument is a file path when one exists, a cached match id
/// otherwise.
pub fn resolve_document(cache: &MatchCache, reference: &str) -> Result<MatchDocument> {
    let path = Path::new(reference);
    if path.is_file() {
        return read_document(path).with_context(|| format!("failed to read {}", path.display()));
    }
    cache
        .load(reference)
        .with_context(|| format!("failed to load match {reference}"))
}

pub fn analyze(
    config: &Config,
    engine: &ScoutEngine,
    document: &str,
    team: &str,
    out: Option<&Path>,
) -> Result<()> {
    let cache = open_cache(config)?;
    let doc = resolve_document(&cache, document)?;
    if doc.team(team).is_none() {
        warn!(match_id = %doc.match_id, team, "team does not appear in this match");
    }
    let analysis = engine.analyze(&doc, team);
    info!(
        match_id = %analysis.match_id,
        results = analysis.results.len(),
        "analysis complete"
    );
    emit(&analysis, out)
}

pub fn report(
    config: &Config,
    engine: &ScoutEngine,
    documents: &[String],
    team: &str,
    out: Option<&Path>,
) -> Result<()> {
    let cache = open_cache(config)?;
    let references = if documents.is_empty() {
        cache
            .match_ids()
            .with_context(|| format!("failed to list {}", cache.dir().display()))?
    } else {
        documents.to_vec()
    };
    if references.is_empty() {
        bail!(
            "no match documents given and the cache at {} is empty; run 'scout convert' first",
            cache.dir().display()
        );
    }

    info!("Loading {} match documents...", references.len());
    let docs = references
        .par_iter()
        .map(|r| resolve_document(&cache, r))
        .collect::<Result<Vec<_>>>()?;

    let report = engine.report(&docs, team);
    emit(&report, out)
}

pub fn list_callouts(engine: &ScoutEngine) {
    let table = engine.callouts();
    let mut any = false;
    for map_id in table.map_ids() {
        any = true;
        let Some(map) = table.map(map_id) else {
            continue;
        };
        let mut super_regions: Vec<&str> =
            map.regions.iter().map(|r| r.super_region.as_str()).collect();
        super_regions.sort_unstable();
        super_regions.dedup();
        println!(
            "{map_id}: {} regions ({})",
            map.regions.len(),
            super_regions.join(", ")
        );
    }
    if !any {
        println!("no maps loaded");
    }
}

fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
