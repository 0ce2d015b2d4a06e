use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entity::Title;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SCOUT_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SCOUT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            storage: StorageConfig::from_env_profiled(p),
            analysis: AnalysisConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  storage:     data_dir={}", self.storage.data_dir.display());
        tracing::info!("  matches:     cache_dir={}", self.storage.match_cache_dir.display());
        tracing::info!("  callouts:    path={}", self.analysis.callouts_path.display());
        tracing::info!(
            "  analysis:    title={}, worker_threads={}",
            self.analysis.default_title,
            self.analysis.resolved_worker_threads()
        );
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Reconstructed match documents, one `{matchId}.json` per match.
    pub match_cache_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        let data_dir = PathBuf::from(profiled_env_or(p, "DATA_DIR", "data"));
        let match_cache_dir = profiled_env_opt(p, "MATCH_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("matches"));
        Self {
            data_dir,
            match_cache_dir,
        }
    }
}

// ── Analysis ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub callouts_path: PathBuf,
    /// Number of per-match pipelines to run in parallel. 0 = available parallelism.
    pub worker_threads: usize,
    pub default_title: Title,
}

impl AnalysisConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            callouts_path: PathBuf::from(profiled_env_or(
                p,
                "CALLOUTS_PATH",
                "config/callouts.yaml",
            )),
            worker_threads: profiled_env_usize(p, "WORKER_THREADS", 0),
            default_title: profiled_env_or(p, "DEFAULT_TITLE", "valorant")
                .parse()
                .unwrap_or(Title::Valorant),
        }
    }

    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}
