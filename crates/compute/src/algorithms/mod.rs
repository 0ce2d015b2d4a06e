pub mod cluster;

pub use cluster::{connected_components, greedy_clusters, Sample};
