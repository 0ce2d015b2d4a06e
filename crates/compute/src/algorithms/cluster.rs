use std::collections::VecDeque;

use scout_core::{CentroidMode, Cluster, Discriminator, Point};

/// A point to be clustered, with an optional discriminator and the key of
/// the round it was observed in.
///
/// Samples with different discriminators never share a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub point: Point,
    pub discriminator: Discriminator,
    pub round: Option<String>,
}

impl Sample {
    pub fn plain(point: Point) -> Self {
        Self {
            point,
            discriminator: Discriminator::default(),
            round: None,
        }
    }

    pub fn tagged(point: Point, discriminator: Discriminator) -> Self {
        Self {
            point,
            discriminator,
            round: None,
        }
    }

    pub fn in_round(mut self, round: impl Into<String>) -> Self {
        self.round = Some(round.into());
        self
    }
}

/// Greedy online-centroid clustering.
///
/// Samples are visited in input order. Each one joins the first existing
/// cluster (in creation order) with an equal discriminator whose *current*
/// centroid is within `radius`; otherwise it starts a new singleton. The
/// joined cluster's centroid is recomputed as the mean of all its members.
///
/// The result depends on input order. Clusters are returned in creation
/// order.
pub fn greedy_clusters(samples: &[Sample], radius: f64) -> Vec<Cluster> {
    let radius_sq = radius * radius;
    let mut clusters: Vec<Cluster> = Vec::new();

    for sample in samples {
        let hit = clusters.iter_mut().find(|c| {
            c.discriminator == sample.discriminator
                && c.centroid.distance_sq(&sample.point) <= radius_sq
        });
        match hit {
            Some(cluster) => {
                cluster.absorb(sample.point, sample.round.as_deref(), CentroidMode::Mean)
            }
            None => clusters.push(Cluster::singleton(
                sample.point,
                sample.discriminator.clone(),
                sample.round.as_deref(),
            )),
        }
    }

    clusters
}

/// Connected-components clustering.
///
/// Two samples share a cluster iff they carry the same discriminator and a
/// chain of samples, each within `radius` of the next, links them. The
/// partition does not depend on input order; clusters are returned in the
/// order of each component's first sample, members in input order.
pub fn connected_components(samples: &[Sample], radius: f64, mode: CentroidMode) -> Vec<Cluster> {
    let n = samples.len();
    let radius_sq = radius * radius;

    let neighbors: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| {
                    j != i
                        && samples[i].discriminator == samples[j].discriminator
                        && samples[i].point.distance_sq(&samples[j].point) <= radius_sq
                })
                .collect()
        })
        .collect();

    let mut component: Vec<Option<usize>> = vec![None; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if component[start].is_some() {
            continue;
        }
        let id = groups.len();
        component[start] = Some(id);
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);

        while let Some(i) = queue.pop_front() {
            for &j in &neighbors[i] {
                if component[j].is_none() {
                    component[j] = Some(id);
                    members.push(j);
                    queue.push_back(j);
                }
            }
        }

        members.sort_unstable();
        groups.push(members);
    }

    groups
        .into_iter()
        .map(|members| {
            let points: Vec<Point> = members.iter().map(|&i| samples[i].point).collect();
            let mut rounds: Vec<String> =
                members.iter().filter_map(|&i| samples[i].round.clone()).collect();
            rounds.sort();
            rounds.dedup();
            Cluster {
                centroid: mode.centroid(&points),
                label: None,
                discriminator: samples[members[0]].discriminator.clone(),
                count: points.len(),
                members: points,
                rounds,
            }
        })
        .collect()
}
