//! # pulse - daily task dashboard
//!
//! Command-line front end for the `taskpulse` engine. Tasks live in a local JSON
//! file; every view is recomputed from that file on each invocation.
//!
//! ## Quick Start
//!
//! ```bash
//! # Today's focus list (the default command)
//! pulse
//!
//! # Add a task for Friday with two checklist items
//! pulse add "Leg day" --category fitness --priority high --date fri \
//!     --subtask "Warm up" --subtask "Squats"
//!
//! # Tick a subtask, reschedule, review
//! pulse subtask "leg day" 1
//! pulse reschedule "leg day" "next week"
//! pulse backlog
//! pulse analytics --heatmap
//! ```
//!
//! ## Key Commands
//!
//! - `pulse dashboard` - today's tasks, completion against the daily target, streak
//! - `pulse tomorrow` / `pulse upcoming` - what is coming, grouped by horizon
//! - `pulse backlog` - overdue and undated work
//! - `pulse history` - completed tasks grouped by day
//! - `pulse analytics` - distributions, most productive weekday, heatmap
//!
//! Add `--json` to any read command for machine-readable output, and `--dry-run` to
//! any write command to see the change without saving it.

use anyhow::Context as _;
use chrono::Local;
use clap::Parser;

mod cli;
mod cmd;

use cli::Cli;
use cmd::{cmd_completions, dispatch, Commands, Context};
use taskpulse::config::PulseConfig;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let command = cli.command.unwrap_or(Commands::Dashboard);
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return Ok(());
    }

    let mut config = PulseConfig::load().context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.store.path = db;
    }
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!(store = %config.store.path.display(), %today, "resolved settings");

    let ctx = Context {
        db_path: config.store.path.clone(),
        today,
        json: cli.json,
        dry_run: cli.dry_run,
        config,
    };
    dispatch(command, &ctx)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PULSE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
