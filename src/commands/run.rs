//! The `run` command: execute one command under one lock.
//!
//! `solorun run <job>` runs a configured job; `solorun run -- <cmd>`
//! runs an ad-hoc command. Either way the command only starts if its
//! lock can be acquired, and a skipped run exits 0 so cron does not
//! mail a failure every time a slow run overlaps the next tick.

use crate::cli::RunArgs;
use crate::config::JobsConfig;
use crate::error::{Result, SolorunError};
use crate::history::{self, RunAction, RunRecord};
use crate::jobs;
use crate::locks::{self, RunOutcome};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything needed to run one command under one lock.
struct RunTarget {
    label: String,
    argv: Vec<String>,
    lock_path: PathBuf,
    workdir: Option<PathBuf>,
    history_file: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) -> Result<()> {
    let target = resolve_target(args)?;

    let started = Instant::now();
    let outcome = locks::run_guarded(&target.lock_path, &target.label, || {
        jobs::run_argv(&target.argv, target.workdir.as_deref())
    });

    record_outcome(
        &target.label,
        &target.lock_path,
        target.history_file.as_deref(),
        &outcome,
        started.elapsed().as_millis() as u64,
    );

    match outcome {
        RunOutcome::Ran(result) => result,
        RunOutcome::SkippedAlreadyRunning { .. } | RunOutcome::SkippedCannotAcquire(_) => Ok(()),
    }
}

/// Figure out what to run, from either a configured job or an ad-hoc
/// command line.
fn resolve_target(args: RunArgs) -> Result<RunTarget> {
    match (&args.job, args.command.is_empty()) {
        (Some(_), false) => Err(SolorunError::UserError(
            "pass either a configured job name or an ad-hoc command after '--', not both"
                .to_string(),
        )),

        (Some(name), true) => {
            let config = JobsConfig::resolve(args.config.as_deref())?;
            let job = config.job(name)?;
            let argv = jobs::parse_command(&job.command)?;

            let lock_path = match args.lock_file {
                Some(path) => path,
                None => config.lock_path_for(name, job),
            };
            let workdir = args.workdir.or_else(|| job.workdir.clone());

            Ok(RunTarget {
                label: name.clone(),
                argv,
                lock_path,
                workdir,
                history_file: config.history_file.clone(),
            })
        }

        (None, true) => Err(SolorunError::UserError(
            "nothing to run: pass a configured job name or a command after '--'".to_string(),
        )),

        (None, false) => {
            let lock_path = args.lock_file.ok_or_else(|| {
                SolorunError::UserError(
                    "ad-hoc commands need --lock-file <path> so concurrent runs can find the same lock"
                        .to_string(),
                )
            })?;

            // Only an explicitly named config contributes history here;
            // ad-hoc runs must work without any config file at all.
            let history_file = match args.config.as_deref() {
                Some(path) => JobsConfig::load(path)?.history_file,
                None => None,
            };

            Ok(RunTarget {
                label: jobs::command_label(&args.command),
                argv: args.command,
                lock_path,
                workdir: args.workdir,
                history_file,
            })
        }
    }
}

/// Append the outcome of one guarded run to the history file, if one is
/// configured. Shared with the `cycle` command.
pub(super) fn record_outcome(
    label: &str,
    lock_path: &Path,
    history_file: Option<&Path>,
    outcome: &RunOutcome,
    duration_ms: u64,
) {
    if history_file.is_none() {
        return;
    }

    let lock_file = lock_path.display().to_string();
    let record = match outcome {
        RunOutcome::Ran(Ok(())) => RunRecord::new(RunAction::Ran).with_details(json!({
            "lock_file": lock_file,
            "duration_ms": duration_ms,
        })),
        RunOutcome::Ran(Err(e)) => RunRecord::new(RunAction::JobFailed).with_details(json!({
            "lock_file": lock_file,
            "duration_ms": duration_ms,
            "error": e.to_string(),
        })),
        RunOutcome::SkippedAlreadyRunning { holder_pid } => {
            RunRecord::new(RunAction::SkippedAlreadyRunning).with_details(json!({
                "lock_file": lock_file,
                "holder_pid": holder_pid,
            }))
        }
        RunOutcome::SkippedCannotAcquire(e) => RunRecord::new(RunAction::SkippedCannotAcquire)
            .with_details(json!({
                "lock_file": lock_file,
                "error": e.to_string(),
            })),
    };

    history::record_best_effort(history_file, &record.with_job(label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use crate::history::read_records;
    use std::fs;
    use tempfile::TempDir;

    fn run_args() -> RunArgs {
        RunArgs {
            job: None,
            config: None,
            lock_file: None,
            workdir: None,
            command: vec![],
        }
    }

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("solorun.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_ad_hoc_command_runs_and_releases() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("job.lock");

        let mut args = run_args();
        args.lock_file = Some(lock_path.clone());
        args.command = argv(&["true"]);

        cmd_run(args).unwrap();
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_ad_hoc_failure_maps_to_job_error() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("job.lock");

        let mut args = run_args();
        args.lock_file = Some(lock_path.clone());
        args.command = argv(&["false"]);

        let err = cmd_run(args).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::JOB_FAILURE);
        // The lock must be released even for a failing command.
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_skip_when_lock_held() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("job.lock");
        let marker = temp_dir.path().join("marker");
        let contents = format!("{}\n", std::process::id());
        fs::write(&lock_path, &contents).unwrap();

        let mut args = run_args();
        args.lock_file = Some(lock_path.clone());
        args.command = vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("touch {}", marker.display()),
        ];

        // Skips are not failures.
        cmd_run(args).unwrap();

        assert!(!marker.exists());
        assert_eq!(fs::read_to_string(&lock_path).unwrap(), contents);
    }

    #[test]
    fn test_ad_hoc_requires_lock_file() {
        let mut args = run_args();
        args.command = argv(&["true"]);

        let err = cmd_run(args).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().contains("--lock-file"));
    }

    #[test]
    fn test_rejects_job_and_command_together() {
        let mut args = run_args();
        args.job = Some("reindex".to_string());
        args.command = argv(&["true"]);

        let err = cmd_run(args).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_nothing_to_run() {
        let err = cmd_run(run_args()).unwrap_err();
        assert!(err.to_string().contains("nothing to run"));
    }

    #[test]
    fn test_configured_job_runs() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("ran");
        let yaml = format!(
            r#"
lock_dir: {dir}
jobs:
  touchjob:
    command: "sh -c 'touch {marker}'"
"#,
            dir = temp_dir.path().display(),
            marker = marker.display()
        );
        let config_path = write_config(&temp_dir, &yaml);

        let mut args = run_args();
        args.job = Some("touchjob".to_string());
        args.config = Some(config_path);

        cmd_run(args).unwrap();

        assert!(marker.exists());
        assert!(!temp_dir.path().join("solorun-touchjob.lock").exists());
    }

    #[test]
    fn test_unknown_job_lists_available() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = format!(
            r#"
lock_dir: {dir}
jobs:
  alpha:
    command: "true"
"#,
            dir = temp_dir.path().display()
        );
        let config_path = write_config(&temp_dir, &yaml);

        let mut args = run_args();
        args.job = Some("nope".to_string());
        args.config = Some(config_path);

        let err = cmd_run(args).unwrap_err();
        assert!(err.to_string().contains("unknown job 'nope'"));
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_run_records_history() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.path().join("history.ndjson");
        let yaml = format!(
            r#"
lock_dir: {dir}
history_file: {history}
jobs:
  quick:
    command: "true"
"#,
            dir = temp_dir.path().display(),
            history = history_file.display()
        );
        let config_path = write_config(&temp_dir, &yaml);

        let mut args = run_args();
        args.job = Some("quick".to_string());
        args.config = Some(config_path);
        cmd_run(args).unwrap();

        let records = read_records(&history_file).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, RunAction::Ran);
        assert_eq!(records[0].job, Some("quick".to_string()));
        assert!(records[0].details["lock_file"].is_string());
    }

    #[test]
    fn test_failed_job_records_job_failed() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.path().join("history.ndjson");
        let yaml = format!(
            r#"
lock_dir: {dir}
history_file: {history}
jobs:
  broken:
    command: "false"
"#,
            dir = temp_dir.path().display(),
            history = history_file.display()
        );
        let config_path = write_config(&temp_dir, &yaml);

        let mut args = run_args();
        args.job = Some("broken".to_string());
        args.config = Some(config_path);
        cmd_run(args).unwrap_err();

        let records = read_records(&history_file).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, RunAction::JobFailed);
        let error = records[0].details["error"].as_str().unwrap();
        assert!(error.contains("exited with code 1"));
    }

    #[test]
    fn test_workdir_flag_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();

        let mut args = run_args();
        args.lock_file = Some(temp_dir.path().join("job.lock"));
        args.workdir = Some(work_dir.path().to_path_buf());
        args.command = argv(&["sh", "-c", "touch marker"]);

        cmd_run(args).unwrap();

        assert!(work_dir.path().join("marker").exists());
    }

    #[test]
    fn test_workdir_flag_overrides_job_workdir() {
        let temp_dir = TempDir::new().unwrap();
        let job_dir = TempDir::new().unwrap();
        let flag_dir = TempDir::new().unwrap();
        let yaml = format!(
            r#"
lock_dir: {dir}
jobs:
  touchjob:
    command: "sh -c 'touch marker'"
    workdir: {workdir}
"#,
            dir = temp_dir.path().display(),
            workdir = job_dir.path().display()
        );
        let config_path = write_config(&temp_dir, &yaml);

        let mut args = run_args();
        args.job = Some("touchjob".to_string());
        args.config = Some(config_path);
        args.workdir = Some(flag_dir.path().to_path_buf());

        cmd_run(args).unwrap();

        assert!(flag_dir.path().join("marker").exists());
        assert!(!job_dir.path().join("marker").exists());
    }
}
