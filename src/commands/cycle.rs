//! The `cycle` command: run every job configured for a cadence.
//!
//! One cron line per cadence drives the whole config:
//!
//! ```text
//! * * * * *    solorun cycle minutely -c /etc/solorun.yaml
//! 0 * * * *    solorun cycle hourly   -c /etc/solorun.yaml
//! ```
//!
//! Jobs run sequentially in name order. Skips are quiet successes;
//! failures are reported at the end so one broken job cannot shadow
//! the others.

use crate::cli::CycleArgs;
use crate::config::{JobsConfig, When};
use crate::error::{Result, SolorunError};
use crate::jobs;
use crate::locks::{self, RunOutcome};
use std::time::Instant;

use super::run::record_outcome;

pub fn cmd_cycle(args: CycleArgs) -> Result<()> {
    let when = When::from_str(&args.when).ok_or_else(|| {
        SolorunError::UserError(format!(
            "unknown cadence '{}'. Valid cadences: minutely, quarter_hourly, hourly, daily, weekly, monthly, yearly",
            args.when
        ))
    })?;

    let config = JobsConfig::resolve(args.config.as_deref())?;
    let due = config.due_jobs(when);
    if due.is_empty() {
        return Ok(());
    }

    let total = due.len();
    let mut failed: Vec<&str> = Vec::new();

    for (name, job) in due {
        let lock_path = config.lock_path_for(name, job);
        let started = Instant::now();

        let outcome = match jobs::parse_command(&job.command) {
            Ok(argv) => locks::run_guarded(&lock_path, name, || {
                jobs::run_argv(&argv, job.workdir.as_deref())
            }),
            // A command that cannot even be parsed must not stop the
            // rest of the cycle.
            Err(err) => {
                eprintln!("Error: job '{}' failed: {}", name, err);
                RunOutcome::Ran(Err(err))
            }
        };

        record_outcome(
            name,
            &lock_path,
            config.history_file.as_deref(),
            &outcome,
            started.elapsed().as_millis() as u64,
        );

        if let RunOutcome::Ran(Err(_)) = &outcome {
            failed.push(name);
        }
    }

    if failed.is_empty() {
        return Ok(());
    }

    Err(SolorunError::JobError(format!(
        "{} of {} {} job(s) failed: {}",
        failed.len(),
        total,
        when,
        failed.join(", ")
    )))
}
