mod cache;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use scout_core::Config;

use crate::cli::{CliArgs, Command};
use crate::commands::ConvertOptions;

fn load_config(profile: Option<&str>) -> Config {
    scout_core::config::load_dotenv();
    match profile {
        Some(p) => Config::for_profile(p),
        None => Config::from_env(),
    }
}

fn configure_threads(config: &Config) {
    let threads = config.analysis.resolved_worker_threads();
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        warn!("Could not size the worker pool to {}: {}", threads, e);
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.profile.as_deref());
    config.log_summary();
    configure_threads(&config);

    match args.command {
        Command::Convert {
            logs,
            title,
            match_id,
            out,
            force,
        } => {
            let opts = ConvertOptions {
                logs,
                title,
                match_id,
                out,
                force,
            };
            commands::convert(&config, &opts)?;
        }
        Command::Analyze {
            document,
            team,
            out,
        } => {
            let engine = commands::load_engine(&config)?;
            commands::analyze(&config, &engine, &document, &team, out.as_deref())?;
        }
        Command::Report {
            documents,
            team,
            out,
        } => {
            let engine = commands::load_engine(&config)?;
            commands::report(&config, &engine, &documents, &team, out.as_deref())?;
        }
        Command::Callouts => {
            let engine = commands::load_engine(&config)?;
            commands::list_callouts(&engine);
            info!(analyzers = ?engine.analyzer_names(), "analyzer catalogue");
        }
    }

    Ok(())
}
