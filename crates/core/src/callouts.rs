//! Static map-geometry table used to name positions.
//!
//! Each map is a list of named regions (fine callouts) grouped into super
//! regions (e.g. "A Site", "Mid"). A position belongs to the region owning
//! its nearest anchor point. The table is read-only after load.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::error::{Result, ScoutError};
use crate::geometry::Point;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalloutTable {
    #[serde(default)]
    maps: BTreeMap<String, MapCallouts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapCallouts {
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub name: String,
    pub super_region: String,
    /// Anchor points as `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
}

/// Result of a callout lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Callout<'a> {
    pub name: &'a str,
    pub super_region: &'a str,
}

impl CalloutTable {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let mut table: CalloutTable = serde_yaml::from_str(raw)?;
        table.maps = std::mem::take(&mut table.maps)
            .into_iter()
            .map(|(k, v)| (normalize_map_id(&k), v))
            .collect();
        for (map, callouts) in &table.maps {
            if let Some(bad) = callouts.regions.iter().find(|r| r.points.is_empty()) {
                return Err(ScoutError::Config(format!(
                    "region '{}' on map '{}' has no anchor points",
                    bad.name, map
                )));
            }
        }
        Ok(table)
    }

    /// Load the table from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let table = Self::from_yaml_str(&raw)?;
        info!(
            path = %path.display(),
            maps = table.maps.len(),
            "callout table loaded"
        );
        Ok(table)
    }

    pub fn insert_map(&mut self, map_id: &str, callouts: MapCallouts) {
        self.maps.insert(normalize_map_id(map_id), callouts);
    }

    pub fn map(&self, map_id: &str) -> Option<&MapCallouts> {
        self.maps.get(&normalize_map_id(map_id))
    }

    pub fn map_ids(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Nearest-anchor lookup. `None` for unknown maps or maps without regions.
    pub fn locate(&self, map_id: &str, point: Point) -> Option<Callout<'_>> {
        let callouts = self.map(map_id)?;
        let mut best: Option<(&Region, f64)> = None;
        for region in &callouts.regions {
            for [x, y] in &region.points {
                let d = point.distance_sq(&Point::new(*x, *y));
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((region, d));
                }
            }
        }
        let (region, _) = best?;
        trace!(map = map_id, region = %region.name, "callout resolved");
        Some(Callout {
            name: &region.name,
            super_region: &region.super_region,
        })
    }

    /// Super region of a point, or `"Unknown"` when the map is not in the table.
    pub fn super_region_of(&self, map_id: &str, point: Point) -> String {
        self.locate(map_id, point)
            .map(|c| c.super_region.to_string())
            .unwrap_or_else(|| UNKNOWN_REGION.to_string())
    }

    /// Fine callout of a point, or `"Unknown"` when the map is not in the table.
    pub fn callout_of(&self, map_id: &str, point: Point) -> String {
        self.locate(map_id, point)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| UNKNOWN_REGION.to_string())
    }
}

pub const UNKNOWN_REGION: &str = "Unknown";

/// Provider map ids arrive in mixed case and sometimes with a path prefix
/// (`/Game/Maps/Ascent`); the table is keyed by the lowercase last segment.
pub fn normalize_map_id(raw: &str) -> String {
    raw.rsplit('/')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_ascii_lowercase()
}
