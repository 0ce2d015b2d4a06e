//! Shared reconstruction machinery for both title state machines.

pub mod inventory;
pub mod state;
pub mod stats;

pub use state::{GameAccumulator, PlayerSighting, ReconstructionState, RoundScratch};
