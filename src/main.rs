//! Preview-Monitor main entry point
//!
//! This is the command-line interface for the Preview-Monitor channel
//! archiver.

use anyhow::Context;
use clap::Parser;
use preview_monitor::config::{load_config_with_hash, Config};
use preview_monitor::url::normalize_channel;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Preview-Monitor: a channel preview archiver
///
/// Continuously scrapes the public preview pages of the given channels,
/// storing newly seen posts in SQLite. Each pass walks a channel's history
/// backward until it reaches content it has already stored, then the monitor
/// sleeps and starts over. Stop it with Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "preview-monitor")]
#[command(version)]
#[command(about = "A channel preview archiver", long_about = None)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, value_name = "PATH")]
    db_path: PathBuf,

    /// Channel to monitor; repeat for several (--channel a --channel b).
    /// Accepts usernames, @names, and t.me URLs
    #[arg(long = "channel", value_name = "NAME")]
    channels: Vec<String>,

    /// File with one channel per line; blank lines and # comments are
    /// skipped. Ignored when --channel flags are given
    #[arg(long, value_name = "PATH")]
    channels_file: Option<PathBuf>,

    /// Optional TOML tuning file (intervals, budgets, HTTP settings)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            return ExitCode::from(1);
        }
    };

    let channels = match gather_channels(&cli) {
        Ok(channels) => channels,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            return ExitCode::from(1);
        }
    };

    if channels.is_empty() {
        eprintln!("[ERROR] Channels must be entered (--channel or --channels-file).");
        return ExitCode::from(2);
    }

    tracing::info!("Monitoring channels: {}", channels.join(", "));

    match preview_monitor::crawler::run(config, channels, &cli.db_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Monitor failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("preview_monitor=info,warn"),
            1 => EnvFilter::new("preview_monitor=debug,info"),
            2 => EnvFilter::new("preview_monitor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the tuning config, falling back to defaults when no file is given
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Collects and normalizes the channel list from flags and/or file
fn gather_channels(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut raw = Vec::new();

    if let Some(path) = &cli.channels_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read channels file {}", path.display()))?;
        raw = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
    }

    // Explicit flags replace the file list
    if !cli.channels.is_empty() {
        raw = cli.channels.clone();
    }

    raw.iter()
        .map(|entry| {
            normalize_channel(entry).with_context(|| format!("Invalid channel '{}'", entry))
        })
        .collect()
}
