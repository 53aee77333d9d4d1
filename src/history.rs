//! Run history for solorun.
//!
//! This module implements an append-only record of run outcomes so an
//! operator can answer "did the nightly job actually run, and if not,
//! why not". Records are stored in NDJSON format (one JSON object per
//! line) in the file named by `history_file` in the config.
//!
//! # Record Format
//!
//! Each record is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The outcome (ran, job_failed, skipped_already_running, ...)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `pid`: PID of the solorun process that wrote the record
//! - `job`: Optional job name (absent for ad-hoc commands without one)
//! - `details`: Freeform object with outcome-specific details
//!
//! History is advisory: a run must never fail or block because its
//! record could not be written, so callers go through
//! [`record_best_effort`] which only warns on failure.

use crate::error::{Result, SolorunError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Outcomes that can be recorded in the run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAction {
    /// The job ran to completion successfully
    Ran,
    /// The job ran and exited with a failure
    JobFailed,
    /// Skipped because a live holder owned the lock
    SkippedAlreadyRunning,
    /// Skipped because the lock could not be acquired at all
    SkippedCannotAcquire,
    /// Lock cleared manually via `solorun clear`
    LockCleared,
}

impl std::fmt::Display for RunAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunAction::Ran => write!(f, "ran"),
            RunAction::JobFailed => write!(f, "job_failed"),
            RunAction::SkippedAlreadyRunning => write!(f, "skipped_already_running"),
            RunAction::SkippedCannotAcquire => write!(f, "skipped_cannot_acquire"),
            RunAction::LockCleared => write!(f, "lock_cleared"),
        }
    }
}

/// A run record for the history log.
///
/// Records are serialized as single-line JSON objects and appended to
/// the history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// RFC3339 timestamp when the outcome was recorded.
    pub ts: DateTime<Utc>,

    /// The outcome of the run.
    pub action: RunAction,

    /// The actor whose invocation produced the record (e.g., `user@HOST`).
    pub actor: String,

    /// PID of the solorun process that wrote the record.
    pub pid: u32,

    /// Optional job name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,

    /// Freeform details object with outcome-specific information.
    pub details: Value,
}

impl RunRecord {
    /// Create a new record with the given outcome.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: RunAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            pid: std::process::id(),
            job: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the job name for this record.
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Set the details object for this record.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the record to a single-line JSON string.
    ///
    /// This is used for NDJSON format where each line is a complete JSON object.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            SolorunError::UserError(format!("failed to serialize run record to JSON: {}", e))
        })
    }
}

/// Get the actor string for record metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append a record to the history file.
///
/// The record is appended as a single JSON line. The file and its parent
/// directory are created if they don't exist. Each append results in one
/// line with a trailing newline.
pub fn append_record(history_file: &Path, record: &RunRecord) -> Result<()> {
    let json_line = record.to_ndjson_line()?;

    if let Some(parent) = history_file.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SolorunError::UserError(format!(
                "failed to create history directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(history_file)
        .map_err(|e| {
            SolorunError::UserError(format!(
                "failed to open history file '{}': {}",
                history_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        SolorunError::UserError(format!(
            "failed to write run record to '{}': {}",
            history_file.display(),
            e
        ))
    })?;

    // Sync to disk for durability
    file.sync_all().map_err(|e| {
        SolorunError::UserError(format!(
            "failed to sync history file '{}': {}",
            history_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read all records from the history file.
///
/// Lines that fail to parse are skipped: history is advisory, and a torn
/// write from a crashed run must not wedge the reader.
pub fn read_records(history_file: &Path) -> Result<Vec<RunRecord>> {
    let content = fs::read_to_string(history_file).map_err(|e| {
        SolorunError::UserError(format!(
            "failed to read history file '{}': {}",
            history_file.display(),
            e
        ))
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

/// Append a record if a history file is configured, warning instead of
/// failing when the write does not succeed.
pub fn record_best_effort(history_file: Option<&Path>, record: &RunRecord) {
    if let Some(path) = history_file
        && let Err(e) = append_record(path, record)
    {
        eprintln!("Warning: failed to record run history: {}", e);
    }
}

/// Render a record as one aligned line for `solorun history`.
pub fn render_line(record: &RunRecord) -> String {
    let job = record.job.as_deref().unwrap_or("-");
    let details = match &record.details {
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    };

    format!(
        "{}  {:<24} {:<16} {}",
        record.ts.format("%Y-%m-%d %H:%M:%S"),
        record.action.to_string(),
        job,
        details
    )
    .trim_end()
    .to_string()
}
