use serde::{Deserialize, Serialize};

/// A 2D position in provider-native game units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    #[inline]
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Arithmetic mean of a set of points. Returns the origin for an empty set.
    pub fn mean(points: &[Point]) -> Point {
        if points.is_empty() {
            return Point::default();
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Per-axis median of a set of points. Even-sized sets average the two
    /// middle values.
    pub fn median(points: &[Point]) -> Point {
        if points.is_empty() {
            return Point::default();
        }
        let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let mut ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        Point::new(median_of(&mut xs), median_of(&mut ys))
    }

    /// Total order used to canonicalize member lists (x, then y).
    pub fn canonical_cmp(&self, other: &Point) -> std::cmp::Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

fn median_of(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// How a cluster's centroid is derived from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentroidMode {
    Mean,
    Median,
}

impl CentroidMode {
    pub fn centroid(self, members: &[Point]) -> Point {
        match self {
            CentroidMode::Mean => Point::mean(members),
            CentroidMode::Median => Point::median(members),
        }
    }
}

/// Discriminator attached to a clustered sample (e.g. ability + agent).
///
/// Two samples may only share a cluster when their discriminators are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl Discriminator {
    pub fn ability(ability_id: impl Into<String>, agent_id: Option<String>) -> Self {
        Self {
            ability_id: Some(ability_id.into()),
            agent_id,
        }
    }
}

/// A spatial grouping of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub centroid: Point,
    /// Callout label of the centroid, filled in by analyzers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_default_discriminator")]
    pub discriminator: Discriminator,
    pub members: Vec<Point>,
    pub count: usize,
    /// Keys of the rounds that contributed members, sorted and unique.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rounds: Vec<String>,
}

fn is_default_discriminator(d: &Discriminator) -> bool {
    d.ability_id.is_none() && d.agent_id.is_none()
}

impl Cluster {
    pub fn singleton(point: Point, discriminator: Discriminator, round: Option<&str>) -> Self {
        Self {
            centroid: point,
            label: None,
            discriminator,
            members: vec![point],
            count: 1,
            rounds: round.map(|r| vec![r.to_string()]).unwrap_or_default(),
        }
    }

    /// Add a member and recompute the centroid over all members.
    pub fn absorb(&mut self, point: Point, round: Option<&str>, mode: CentroidMode) {
        self.members.push(point);
        self.count = self.members.len();
        self.centroid = mode.centroid(&self.members);
        if let Some(round) = round {
            self.add_round(round);
        }
    }

    /// Union another cluster's members and rounds into this one and
    /// recompute the centroid. Members are kept in canonical order.
    pub fn merge(&mut self, other: &Cluster, mode: CentroidMode) {
        self.members.extend_from_slice(&other.members);
        self.members.sort_by(|a, b| a.canonical_cmp(b));
        self.count = self.members.len();
        self.centroid = mode.centroid(&self.members);
        for round in &other.rounds {
            self.add_round(round);
        }
    }

    /// Distinct rounds the cluster covers. Several members from one round
    /// count once.
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    fn add_round(&mut self, round: &str) {
        if let Err(at) = self.rounds.binary_search_by(|r| r.as_str().cmp(round)) {
            self.rounds.insert(at, round.to_string());
        }
    }
}
