//! Local match-document cache: one `{matchId}.json` per converted match.

use std::fs;
use std::path::{Path, PathBuf};

use scout_core::{MatchDocument, Result, ScoutError};
use tracing::debug;

pub struct MatchCache {
    dir: PathBuf,
}

impl MatchCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, match_id: &str) -> PathBuf {
        let file: String = match_id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.path_for(match_id).is_file()
    }

    pub fn load(&self, match_id: &str) -> Result<MatchDocument> {
        let path = self.path_for(match_id);
        if !path.is_file() {
            return Err(ScoutError::MatchNotFound(match_id.to_string()));
        }
        read_document(&path)
    }

    /// Write the document under its match id, replacing any earlier copy.
    pub fn store(&self, doc: &MatchDocument) -> Result<PathBuf> {
        let path = self.path_for(&doc.match_id);
        write_document(&path, doc)?;
        debug!(match_id = %doc.match_id, path = %path.display(), "match cached");
        Ok(path)
    }

    /// Cached match ids, sorted.
    pub fn match_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

pub fn read_document(path: &Path) -> Result<MatchDocument> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_document(path: &Path, doc: &MatchDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(doc)?)?;
    Ok(())
}
