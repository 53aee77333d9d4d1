//! Configuration model for solorun.
//!
//! This module defines the JobsConfig struct that represents `solorun.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

use crate::error::{Result, SolorunError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File name looked up in the current directory when no --config is given.
pub const DEFAULT_FILE_NAME: &str = "solorun.yaml";

/// Job names become lock file names, so they are restricted to characters
/// that are safe in a path segment.
static JOB_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("Invalid job name regex"));

/// Cadence a scheduled job belongs to.
///
/// Each `solorun cycle <when>` invocation runs every job configured with
/// the matching cadence. The cadences mirror the common cron granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    Minutely,
    QuarterHourly,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl When {
    /// Parse a cadence from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "minutely" => Some(Self::Minutely),
            "quarter_hourly" => Some(Self::QuarterHourly),
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// The canonical spelling used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutely => "minutely",
            Self::QuarterHourly => "quarter_hourly",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for When {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configured job.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobSpec {
    /// Shell-style command line to execute.
    pub command: String,

    /// Cadence this job runs on. Jobs without one never run during a
    /// cycle and must be invoked by name.
    pub when: Option<When>,

    /// Lock file override. Jobs that share a lock file exclude each other:
    /// only one of them can be running at a time.
    pub lock_file: Option<PathBuf>,

    /// Working directory the command is started in.
    pub workdir: Option<PathBuf>,
}

/// Configuration for the solorun job runner.
///
/// This struct represents the contents of `solorun.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Directory where default lock files are created.
    #[serde(default = "default_lock_dir")]
    pub lock_dir: PathBuf,

    /// Optional NDJSON file where run outcomes are appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Jobs by name. A BTreeMap keeps listings and cycles in name order.
    #[serde(default)]
    pub jobs: BTreeMap<String, JobSpec>,
}

// Default value functions for serde
fn default_lock_dir() -> PathBuf {
    std::env::temp_dir()
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            lock_dir: default_lock_dir(),
            history_file: None,
            jobs: BTreeMap::new(),
        }
    }
}

impl JobsConfig {
    /// Load the config from an explicit path, or from `solorun.yaml` in the
    /// current directory when none is given.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_FILE_NAME);
                if !path.exists() {
                    return Err(SolorunError::UserError(format!(
                        "no config file found at '{}'. Create one or pass --config <path>.",
                        path.display()
                    )));
                }
                Self::load(path)
            }
        }
    }

    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SolorunError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: JobsConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SolorunError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_dir` must be non-empty
    /// - job names must be path-safe: letters, digits, `-` and `_`,
    ///   starting with a letter or digit
    /// - every job must have a non-empty `command`
    /// - an explicit `lock_file` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.lock_dir.as_os_str().is_empty() {
            return Err(SolorunError::UserError(
                "config validation failed: lock_dir must not be empty".to_string(),
            ));
        }

        for (name, job) in &self.jobs {
            if !JOB_NAME_REGEX.is_match(name) {
                return Err(SolorunError::UserError(format!(
                    "config validation failed: invalid job name '{}'. Names become lock file names: use letters, digits, '-' and '_', starting with a letter or digit.",
                    name
                )));
            }

            if job.command.trim().is_empty() {
                return Err(SolorunError::UserError(format!(
                    "config validation failed: job '{}' has an empty command",
                    name
                )));
            }

            if let Some(lock_file) = &job.lock_file
                && lock_file.as_os_str().is_empty()
            {
                return Err(SolorunError::UserError(format!(
                    "config validation failed: job '{}' has an empty lock_file",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Look up a job by name.
    pub fn job(&self, name: &str) -> Result<&JobSpec> {
        self.jobs.get(name).ok_or_else(|| {
            let available = if self.jobs.is_empty() {
                "none configured".to_string()
            } else {
                self.jobs.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            SolorunError::UserError(format!(
                "unknown job '{}'. Available jobs: {}",
                name, available
            ))
        })
    }

    /// The lock file guarding a job: its explicit `lock_file`, or a
    /// per-job file under `lock_dir`.
    pub fn lock_path_for(&self, name: &str, job: &JobSpec) -> PathBuf {
        match &job.lock_file {
            Some(path) => path.clone(),
            None => self.lock_dir.join(format!("solorun-{}.lock", name)),
        }
    }

    /// Jobs configured for the given cadence, in name order.
    pub fn due_jobs(&self, when: When) -> Vec<(&str, &JobSpec)> {
        self.jobs
            .iter()
            .filter(|(_, job)| job.when == Some(when))
            .map(|(name, job)| (name.as_str(), job))
            .collect()
    }
}
