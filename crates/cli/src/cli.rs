use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scout_core::Title;

/// Esports telemetry reconstruction and team scouting.
///
/// Converts provider event logs into match documents, caches them by match
/// id, and merges per-match analytics into one scouting report per team.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about)]
pub struct CliArgs {
    /// Config profile (overrides SCOUT_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconstruct event logs into match documents and cache them
    Convert {
        /// Line-delimited event log files
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// Game title of the logs (default: DEFAULT_TITLE)
        #[arg(long)]
        title: Option<Title>,

        /// Match id; only valid with a single log (default: file stem)
        #[arg(long)]
        match_id: Option<String>,

        /// Also write the document here; only valid with a single log
        #[arg(long)]
        out: Option<PathBuf>,

        /// Re-convert logs whose match id is already cached
        #[arg(long)]
        force: bool,
    },

    /// Run every analyzer over one match for one team
    Analyze {
        /// Match document path, or a cached match id
        document: String,

        /// Team to scout
        #[arg(long, env = "SCOUT_TEAM")]
        team: String,

        /// Write the analysis here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Merge many matches into one scouting report
    Report {
        /// Match document paths or cached match ids (default: the whole cache)
        documents: Vec<String>,

        /// Team to scout
        #[arg(long, env = "SCOUT_TEAM")]
        team: String,

        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List maps in the callout table
    Callouts,
}
