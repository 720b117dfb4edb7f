//! CLI entry point for scanwedge.
//!
//! # Usage
//!
//! ```bash
//! scanwedge [OPTIONS] <COMMAND>
//!
//! # Interactive console with a scan-enabled demo form
//! scanwedge console
//!
//! # Replay a scripted timeline and print deliveries as JSON lines
//! scanwedge simulate --timeline session.json
//! scanwedge simulate --preset mixed --idle-gap-ms 50
//!
//! # Print the effective configuration
//! scanwedge --config scanwedge.json config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod timeline;

use std::io::Write;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use sw_core::Config;
use sw_core::config::parse_terminator;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::timeline::{Preset, Timeline};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Tell barcode scanner bursts apart from human typing and route scanned
/// codes to the focused field.
#[derive(Parser)]
#[command(name = "scanwedge", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file. Every field is optional.
    #[arg(short, long, global = true, env = "SCANWEDGE_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Silence (ms) after which a burst is evaluated.
    #[arg(long, global = true, env = "SCANWEDGE_IDLE_GAP_MS")]
    idle_gap_ms: Option<u64>,

    /// Minimum number of characters for a burst to count as a scan.
    #[arg(long, global = true, env = "SCANWEDGE_MIN_LENGTH")]
    min_length: Option<usize>,

    /// Terminator completing a burst at once (enter, cr, tab or one
    /// character). Repeat for several; replaces the configured set.
    #[arg(long, global = true, value_parser = parse_terminator)]
    terminator: Vec<char>,

    /// Accept pasted codes that are not all digits.
    #[arg(long, global = true)]
    allow_alphanumeric_paste: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the interactive scan console.
    Console {
        /// Log file (defaults to the configured one, then the temp dir).
        #[arg(long)]
        log_file: Option<Utf8PathBuf>,
    },

    /// Replay a timeline on a virtual clock and print deliveries.
    Simulate {
        /// Timeline JSON file.
        #[arg(short, long, conflicts_with = "preset")]
        timeline: Option<Utf8PathBuf>,

        /// Generated timeline to replay when no file is given.
        #[arg(short, long, value_enum, default_value_t = Preset::Scan)]
        preset: Preset,

        /// Print the capture counters after the deliveries.
        #[arg(long)]
        stats: bool,
    },

    /// Print the effective configuration as JSON.
    Config,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Where log lines go.
enum LogTarget<'a> {
    /// Standard error, keeping stdout for command output.
    Stderr,
    /// A file, keeping the terminal clean for the console.
    File(&'a Utf8Path),
}

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool, target: &LogTarget<'_>) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn"))
    });

    let (writer, use_ansi) = match target {
        LogTarget::Stderr => (
            BoxMakeWriter::new(std::io::stderr),
            !no_color && std::env::var("NO_COLOR").is_err(),
        ),
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(writer),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Builds the effective [`Config`]: file first, then flag overrides.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(gap) = cli.idle_gap_ms {
        config.capture.idle_gap_ms = gap;
    }
    if let Some(min) = cli.min_length {
        config.capture.min_code_length = min;
    }
    if !cli.terminator.is_empty() {
        config.capture.terminators = cli.terminator.iter().copied().collect();
    }
    if cli.allow_alphanumeric_paste {
        config.capture.numeric_only = false;
    }

    Ok(config.sanitized())
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the interactive console.
///
/// # Errors
///
/// Returns an error if the console fails.
async fn run_console(config: Config) -> color_eyre::Result<()> {
    info!(
        idle_gap_ms = config.capture.idle_gap_ms,
        min_code_length = config.capture.min_code_length,
        "Starting console"
    );

    // Handle SIGTERM for graceful shutdown on Unix
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = sw_tui::run(config) => {
                result.map_err(|e| color_eyre::eyre::eyre!("Console error: {}", e))?;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        sw_tui::run(config)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Console error: {}", e))?;
    }

    Ok(())
}

/// Replays a timeline and prints one JSON object per delivery.
///
/// # Errors
///
/// Returns an error if the timeline cannot be loaded or output fails.
fn run_simulate(
    config: &Config,
    timeline: Option<&Utf8Path>,
    preset: Preset,
    show_stats: bool,
) -> color_eyre::Result<()> {
    let timeline = match timeline {
        Some(path) => Timeline::load(path).map_err(|e| color_eyre::eyre::eyre!("{e:#}"))?,
        None => Timeline::preset(preset),
    };
    info!(
        steps = timeline.steps.len(),
        fields = timeline.fields.len(),
        "Replaying timeline"
    );

    let replay = timeline::replay(&timeline, config);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for delivery in &replay.deliveries {
        writeln!(handle, "{}", serde_json::to_string(delivery)?)?;
    }
    if show_stats {
        writeln!(
            handle,
            "{}",
            serde_json::json!({ "stats": replay.stats })
        )?;
    }

    Ok(())
}

/// Prints the effective configuration.
///
/// # Errors
///
/// Returns an error if serialization or output fails.
fn run_config(config: &Config) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", serde_json::to_string_pretty(config)?)?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing, then build the configuration so clamp warnings
    //    are logged. The console logs to a file; everything else to stderr.
    match &cli.command {
        Commands::Console { log_file } => {
            // The configured log file is only known after loading the config.
            let config = build_config(&cli)?;
            let path = log_file
                .clone()
                .or_else(|| config.tui.log_file.clone())
                .or_else(|| {
                    Utf8PathBuf::from_path_buf(std::env::temp_dir().join("scanwedge.log")).ok()
                });
            match &path {
                Some(path) => init_tracing(cli.verbose, cli.no_color, &LogTarget::File(path))?,
                None => init_tracing(cli.verbose, cli.no_color, &LogTarget::Stderr)?,
            }
            run_console(config).await
        }
        Commands::Simulate {
            timeline,
            preset,
            stats,
        } => {
            init_tracing(cli.verbose, cli.no_color, &LogTarget::Stderr)?;
            let config = build_config(&cli)?;
            run_simulate(&config, timeline.as_deref(), *preset, *stats)
        }
        Commands::Config => {
            init_tracing(cli.verbose, cli.no_color, &LogTarget::Stderr)?;
            let config = build_config(&cli)?;
            run_config(&config)
        }
    }
}
