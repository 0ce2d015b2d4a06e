/// Integration tests for the scouting pipeline: match documents in their
/// JSON contract form, analyzed and merged into one report.

mod helpers;
mod scouting;
