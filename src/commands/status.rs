//! The `status` command: report lock state without touching it.
//!
//! Inspection is read-only. A stale lock stays on disk until the next
//! run reclaims it or an operator clears it.

use crate::cli::StatusArgs;
use crate::config::JobsConfig;
use crate::error::{Result, SolorunError};
use crate::locks::{self, LockStatus};
use std::path::PathBuf;

pub fn cmd_status(args: StatusArgs) -> Result<()> {
    if args.job.is_some() && args.lock_file.is_some() {
        return Err(SolorunError::UserError(
            "pass either a job name or --lock-file, not both".to_string(),
        ));
    }

    let entries: Vec<(String, PathBuf)> = if let Some(lock_file) = args.lock_file {
        vec![(lock_file.display().to_string(), lock_file)]
    } else {
        let config = JobsConfig::resolve(args.config.as_deref())?;
        match &args.job {
            Some(name) => {
                let job = config.job(name)?;
                vec![(name.clone(), config.lock_path_for(name, job))]
            }
            None => config
                .jobs
                .iter()
                .map(|(name, job)| (name.clone(), config.lock_path_for(name, job)))
                .collect(),
        }
    };

    if entries.is_empty() {
        println!("No jobs configured.");
        return Ok(());
    }

    println!("Locks ({}):", entries.len());
    println!();

    let mut stale_count = 0usize;
    for (name, path) in &entries {
        let status = locks::inspect(path);
        if matches!(status, LockStatus::Stale { .. }) {
            stale_count += 1;
        }
        println!("  {}:", name);
        println!("    Path:   {}", path.display());
        println!("    Status: {}", status);
        println!();
    }

    if stale_count > 0 {
        println!(
            "Note: {} lock(s) are stale and will be reclaimed on the next run.",
            stale_count
        );
    }

    Ok(())
}
