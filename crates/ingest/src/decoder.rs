//! Line-delimited event log decoder.
//!
//! Each line is parsed on its own. Lines that are not a single JSON value of
//! the batch shape are skipped and logged; the decoder never looks at event
//! semantics.

use std::io::BufRead;

use serde::Serialize;
use tracing::{debug, warn};

use crate::wire::EventBatch;

/// Summary of one decode pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    pub lines_read: usize,
    pub batches_decoded: usize,
    pub lines_skipped: usize,
}

/// Decode a full log held in memory.
pub fn decode_str(text: &str) -> (Vec<EventBatch>, DecodeStats) {
    let mut batches = Vec::new();
    let mut stats = DecodeStats::default();
    for (idx, line) in text.lines().enumerate() {
        decode_line(idx + 1, line, &mut batches, &mut stats);
    }
    finish(batches, stats)
}

/// Decode from any buffered reader. I/O errors end the stream; lines already
/// decoded are kept.
pub fn decode_reader<R: BufRead>(reader: R) -> (Vec<EventBatch>, DecodeStats) {
    let mut batches = Vec::new();
    let mut stats = DecodeStats::default();
    for (idx, line) in reader.lines().enumerate() {
        match line {
            Ok(line) => decode_line(idx + 1, &line, &mut batches, &mut stats),
            Err(e) => {
                warn!(line = idx + 1, error = %e, "log read failed, stopping decode");
                break;
            }
        }
    }
    finish(batches, stats)
}

fn decode_line(
    line_no: usize,
    line: &str,
    batches: &mut Vec<EventBatch>,
    stats: &mut DecodeStats,
) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    stats.lines_read += 1;
    match serde_json::from_str::<EventBatch>(line) {
        Ok(batch) => {
            stats.batches_decoded += 1;
            batches.push(batch);
        }
        Err(e) => {
            stats.lines_skipped += 1;
            warn!(line = line_no, error = %e, "skipping malformed log line");
        }
    }
}

fn finish(batches: Vec<EventBatch>, stats: DecodeStats) -> (Vec<EventBatch>, DecodeStats) {
    debug!(
        lines = stats.lines_read,
        batches = stats.batches_decoded,
        skipped = stats.lines_skipped,
        "event log decoded"
    );
    (batches, stats)
}
