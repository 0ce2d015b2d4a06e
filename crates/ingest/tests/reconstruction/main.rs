/// Integration tests for log decoding and per-title match reconstruction:
/// phase boundaries, purchases, combat facts, veto sequencing and stats.

mod cs2;
mod helpers;
mod valorant;
