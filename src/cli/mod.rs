//! CLI argument parsing for solorun.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solorun: run scheduled jobs with at-most-one-instance semantics.
///
/// Each job is guarded by a PID lock file:
/// - While the file exists and its PID is alive, the job is running
/// - A second invocation skips instead of starting a duplicate
/// - Locks left behind by dead processes are reclaimed automatically
#[derive(Parser, Debug)]
#[command(name = "solorun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for solorun.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a configured job by name, or an ad-hoc command after `--`.
    ///
    /// Acquires the job's lock file before the command starts and
    /// releases it afterwards. If another live process holds the lock,
    /// the run is skipped with a warning and solorun exits 0.
    Run(RunArgs),

    /// Run every job configured for a cadence.
    ///
    /// This is the scheduler entry point: point one cron line per
    /// cadence at `solorun cycle <when>`. Jobs run in name order; a job
    /// that is already running is skipped, and one failing job does not
    /// stop the others.
    Cycle(CycleArgs),

    /// List configured jobs.
    ///
    /// Shows each job's cadence, command, and lock file.
    List(ListArgs),

    /// Show lock status for jobs.
    ///
    /// Reports whether each lock file is free, held by a live process,
    /// or stale. Status never modifies a lock; stale locks are
    /// reclaimed automatically on the next run.
    Status(StatusArgs),

    /// Remove a lock file by hand.
    ///
    /// Requires --force to prevent accidental clearing. Stale locks
    /// never need this (the next run reclaims them); clearing exists
    /// for the rare situations automatic reclaim cannot handle.
    Clear(ClearArgs),

    /// Show recent run history.
    ///
    /// Prints the last records from the NDJSON history file, oldest
    /// first.
    History(HistoryArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Name of a configured job to run.
    pub job: Option<String>,

    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Lock file to use instead of the configured one.
    #[arg(long)]
    pub lock_file: Option<PathBuf>,

    /// Working directory the command is started in.
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Ad-hoc command to run, given after `--`.
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the `cycle` command.
#[derive(Parser, Debug)]
pub struct CycleArgs {
    /// Cadence to run (minutely, quarter_hourly, hourly, daily, weekly,
    /// monthly, yearly).
    pub when: String,

    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Job whose lock to inspect. If omitted, inspects every configured job.
    pub job: Option<String>,

    /// Inspect a specific lock file instead of a configured job.
    #[arg(long)]
    pub lock_file: Option<PathBuf>,

    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Job whose lock to clear.
    pub job: Option<String>,

    /// Clear a specific lock file instead of a configured job's.
    #[arg(long)]
    pub lock_file: Option<PathBuf>,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,

    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `history` command.
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Show the last N records.
    #[arg(long, default_value_t = 10)]
    pub tail: usize,

    /// Read this history file instead of the configured one.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Path to the config file (default: ./solorun.yaml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
