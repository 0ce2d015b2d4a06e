//! Event log ingestion: line decoder plus one reconstructor per title.

pub mod cs2;
pub mod decoder;
pub mod reconstruct;
pub mod valorant;
pub mod wire;

use scout_core::{MatchDocument, Title};
use tracing::info;

pub use decoder::{decode_reader, decode_str, DecodeStats};
pub use wire::{EventBatch, RawEvent, SeriesState};

/// Reconstruct a decoded log with the title's state machine.
pub fn reconstruct(title: Title, match_id: &str, batches: &[EventBatch]) -> MatchDocument {
    match title {
        Title::Valorant => valorant::reconstruct(match_id, batches),
        Title::Cs2 => cs2::reconstruct(match_id, batches),
    }
}

/// Decode and reconstruct a full log in one call.
pub fn convert_log(title: Title, match_id: &str, text: &str) -> (MatchDocument, DecodeStats) {
    let (batches, stats) = decode_str(text);
    let document = reconstruct(title, match_id, &batches);
    info!(
        match_id,
        %title,
        batches = stats.batches_decoded,
        skipped = stats.lines_skipped,
        games = document.games.len(),
        "log converted"
    );
    (document, stats)
}
