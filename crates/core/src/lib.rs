pub mod callouts;
pub mod config;
pub mod document;
pub mod entity;
pub mod error;
pub mod geometry;

pub use callouts::{CalloutTable, MapCallouts, Region};
pub use config::Config;
pub use document::*;
pub use entity::*;
pub use error::*;
pub use geometry::*;
