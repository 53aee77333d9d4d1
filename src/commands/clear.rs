//! The `clear` command: remove a lock file by hand.
//!
//! Stale locks never need this; the next run reclaims them. Clearing
//! is for deliberately preempting a live holder, which is why it
//! demands --force and warns when the holder is still alive.

use crate::cli::ClearArgs;
use crate::config::JobsConfig;
use crate::error::{Result, SolorunError};
use crate::history::{self, RunAction, RunRecord};
use crate::locks::{self, LockStatus};
use serde_json::json;
use std::fs;
use std::path::Path;

/// What `solorun clear` operates on.
#[derive(Clone, Copy)]
enum ClearTarget<'a> {
    Job(&'a str),
    File(&'a Path),
}

pub fn cmd_clear(args: ClearArgs) -> Result<()> {
    let target = match (&args.job, &args.lock_file) {
        (Some(_), Some(_)) => {
            return Err(SolorunError::UserError(
                "pass either a job name or --lock-file, not both".to_string(),
            ));
        }
        (None, None) => {
            return Err(SolorunError::UserError(
                "pass a job name or --lock-file to choose which lock to clear".to_string(),
            ));
        }
        (Some(name), None) => ClearTarget::Job(name.as_str()),
        (None, Some(path)) => ClearTarget::File(path.as_path()),
    };

    let (label, rerun) = match target {
        ClearTarget::Job(name) => (name.to_string(), format!("solorun clear {} --force", name)),
        ClearTarget::File(path) => (
            path.display().to_string(),
            format!("solorun clear --lock-file {} --force", path.display()),
        ),
    };

    // Require --force before touching config or disk.
    if !args.force {
        return Err(SolorunError::UserError(format!(
            "refusing to clear lock '{}' without --force.\n\n\
             Clearing a lock held by a live process lets a second instance start\n\
             while the first is still running. Stale locks never need clearing:\n\
             they are reclaimed automatically on the next run.\n\n\
             To clear the lock, run:\n  {}",
            label, rerun
        )));
    }

    let (lock_path, history_file) = match target {
        ClearTarget::Job(name) => {
            let config = JobsConfig::resolve(args.config.as_deref())?;
            let job = config.job(name)?;
            (config.lock_path_for(name, job), config.history_file.clone())
        }
        ClearTarget::File(path) => {
            let history_file = match args.config.as_deref() {
                Some(config_path) => JobsConfig::load(config_path)?.history_file,
                None => None,
            };
            (path.to_path_buf(), history_file)
        }
    };

    let status = locks::inspect(&lock_path);
    match status {
        LockStatus::Free => {
            return Err(SolorunError::UserError(format!(
                "no lock file at '{}'",
                lock_path.display()
            )));
        }
        LockStatus::HeldByLiveProcess { holder_pid } => {
            eprintln!(
                "Warning: the recorded holder (pid {}) is still alive; a second instance can now start while it runs",
                holder_pid
            );
        }
        LockStatus::Stale { .. } => {}
    }

    fs::remove_file(&lock_path).map_err(|e| {
        SolorunError::LockError(format!(
            "failed to clear lock '{}': {}",
            lock_path.display(),
            e
        ))
    })?;

    let record = RunRecord::new(RunAction::LockCleared).with_details(json!({
        "lock_file": lock_path.display().to_string(),
        "was_held_by_live_process": matches!(status, LockStatus::HeldByLiveProcess { .. }),
        "holder_pid": status.holder_pid(),
        "force": true,
    }));
    let record = match target {
        ClearTarget::Job(name) => record.with_job(name),
        ClearTarget::File(_) => record,
    };
    history::record_best_effort(history_file.as_deref(), &record);

    println!("Cleared lock: {}", label);
    println!();
    println!("Lock details:");
    println!("  Path:   {}", lock_path.display());
    println!("  Was:    {}", status);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use crate::history::read_records;
    use crate::test_support::NO_SUCH_PID;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn clear_args() -> ClearArgs {
        ClearArgs {
            job: None,
            lock_file: None,
            force: false,
            config: None,
        }
    }

    #[test]
    fn test_clear_refuses_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("job.lock");
        fs::write(&lock_path, format!("{}\n", NO_SUCH_PID)).unwrap();

        let mut args = clear_args();
        args.lock_file = Some(lock_path.clone());

        let err = cmd_clear(args).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().contains("--force"));
        assert!(lock_path.exists());
    }

    #[test]
    fn test_clear_requires_a_target() {
        let mut args = clear_args();
        args.force = true;

        let err = cmd_clear(args).unwrap_err();
        assert!(err.to_string().contains("pass a job name or --lock-file"));
    }

    #[test]
    fn test_clear_rejects_job_and_lock_file_together() {
        let mut args = clear_args();
        args.job = Some("reindex".to_string());
        args.lock_file = Some(PathBuf::from("/tmp/job.lock"));
        args.force = true;

        let err = cmd_clear(args).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_clear_removes_stale_lock() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("job.lock");
        fs::write(&lock_path, format!("{}\n", NO_SUCH_PID)).unwrap();

        let mut args = clear_args();
        args.lock_file = Some(lock_path.clone());
        args.force = true;

        cmd_clear(args).unwrap();
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_clear_missing_lock() {
        let temp_dir = TempDir::new().unwrap();

        let mut args = clear_args();
        args.lock_file = Some(temp_dir.path().join("absent.lock"));
        args.force = true;

        let err = cmd_clear(args).unwrap_err();
        assert!(err.to_string().contains("no lock file at"));
    }

    #[test]
    fn test_clear_by_job_name() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = format!(
            r#"
lock_dir: {dir}
jobs:
  reindex:
    command: "true"
"#,
            dir = temp_dir.path().display()
        );
        let config_path = temp_dir.path().join("solorun.yaml");
        fs::write(&config_path, yaml).unwrap();

        let lock_path = temp_dir.path().join("solorun-reindex.lock");
        fs::write(&lock_path, format!("{}\n", NO_SUCH_PID)).unwrap();

        let mut args = clear_args();
        args.job = Some("reindex".to_string());
        args.config = Some(config_path);
        args.force = true;

        cmd_clear(args).unwrap();
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_clear_records_history() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.path().join("history.ndjson");
        let yaml = format!(
            r#"
lock_dir: {dir}
history_file: {history}
jobs:
  reindex:
    command: "true"
"#,
            dir = temp_dir.path().display(),
            history = history_file.display()
        );
        let config_path = temp_dir.path().join("solorun.yaml");
        fs::write(&config_path, yaml).unwrap();

        let lock_path = temp_dir.path().join("solorun-reindex.lock");
        fs::write(&lock_path, format!("{}\n", NO_SUCH_PID)).unwrap();

        let mut args = clear_args();
        args.job = Some("reindex".to_string());
        args.config = Some(config_path);
        args.force = true;
        cmd_clear(args).unwrap();

        let records = read_records(&history_file).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, RunAction::LockCleared);
        assert_eq!(records[0].job, Some("reindex".to_string()));
        assert_eq!(records[0].details["was_held_by_live_process"], false);
        assert_eq!(records[0].details["holder_pid"], NO_SUCH_PID);
        assert_eq!(records[0].details["force"], true);
    }

    #[test]
    fn test_clear_by_lock_file_records_without_job() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.path().join("history.ndjson");
        let yaml = format!(
            r#"
lock_dir: {dir}
history_file: {history}
"#,
            dir = temp_dir.path().display(),
            history = history_file.display()
        );
        let config_path = temp_dir.path().join("solorun.yaml");
        fs::write(&config_path, yaml).unwrap();

        let lock_path = temp_dir.path().join("adhoc.lock");
        fs::write(&lock_path, format!("{}\n", NO_SUCH_PID)).unwrap();

        let mut args = clear_args();
        args.lock_file = Some(lock_path.clone());
        args.config = Some(config_path);
        args.force = true;
        cmd_clear(args).unwrap();

        assert!(!lock_path.exists());
        let records = read_records(&history_file).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, RunAction::LockCleared);
        // A lock cleared by path has no job name to record.
        assert_eq!(records[0].job, None);
    }
}
