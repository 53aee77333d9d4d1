//! Lock acquisition, inspection, and the guarded-run composition.

use super::guard::LockGuard;
use super::probe::{KillProbe, ProcessProbe};
use super::types::{Acquisition, LockStatus, RunOutcome};
use crate::error::{Result, SolorunError};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process;

/// Create the lock file exclusively and record our PID in it.
///
/// The io error is returned untranslated so the caller can tell "the
/// file is already there" apart from every other failure.
fn create_pid_file(lock_path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)?;

    let contents = format!("{}\n", process::id());
    if let Err(e) = file.write_all(contents.as_bytes()) {
        // Clean up the lock file on write failure, otherwise a file with
        // no valid holder would shadow the lock until someone reclaims it
        let _ = fs::remove_file(lock_path);
        return Err(e);
    }
    if let Err(e) = file.sync_all() {
        // Clean up the lock file on sync failure
        let _ = fs::remove_file(lock_path);
        return Err(e);
    }

    Ok(())
}

/// Read the PID recorded in a lock file.
///
/// `None` means the file is unreadable or does not contain a plain
/// decimal PID. Zero is rejected too: no real holder writes it, and a
/// lock file that cannot name its holder must stay reclaimable.
pub fn read_pid(lock_path: &Path) -> Option<u32> {
    parse_pid(&fs::read_to_string(lock_path).ok()?)
}

fn parse_pid(contents: &str) -> Option<u32> {
    let pid = contents.trim().parse::<u32>().ok()?;
    if pid == 0 { None } else { Some(pid) }
}

/// Remove a lock file whose holder has been verified dead.
fn break_stale(lock_path: &Path) -> Result<()> {
    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        // Already gone: another reclaimer beat us to the removal.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SolorunError::LockError(format!(
            "failed to remove stale lock '{}': {}",
            lock_path.display(),
            e
        ))),
    }
}

/// Try to take exclusive ownership of `lock_path`, probing liveness with
/// `kill(pid, 0)`.
pub fn acquire(lock_path: &Path) -> Result<Acquisition> {
    acquire_with_probe(lock_path, &KillProbe)
}

/// Try to take exclusive ownership of `lock_path`.
///
/// The happy path is a single exclusive create. When the file already
/// exists, the recorded holder decides the outcome: a live holder keeps
/// the lock and the call reports it, while a dead or unreadable holder
/// means the lock is stale and is reclaimed (delete, then retry the
/// create exactly once). Losing that single retry to another reclaimer,
/// or any filesystem failure, is an error; the caller must not run the
/// guarded action.
///
/// Acquisition never blocks and never waits for the lock to free.
pub fn acquire_with_probe(lock_path: &Path, probe: &dyn ProcessProbe) -> Result<Acquisition> {
    match create_pid_file(lock_path) {
        Ok(()) => {
            return Ok(Acquisition::Acquired(LockGuard::new(
                lock_path.to_path_buf(),
            )));
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => {
            return Err(SolorunError::LockError(format!(
                "failed to acquire lock '{}': {}",
                lock_path.display(),
                e
            )));
        }
    }

    // The file exists. Only a live holder keeps us out.
    if let Some(pid) = read_pid(lock_path)
        && probe.is_alive(pid)
    {
        return Ok(Acquisition::HeldByLiveProcess { holder_pid: pid });
    }

    // Stale: the recorded holder is gone, or the file never named one.
    // Break the lock and retry the create once; a second existence
    // failure means another process won the reclaim, and looping would
    // turn a non-blocking acquire into a spin.
    break_stale(lock_path)?;
    match create_pid_file(lock_path) {
        Ok(()) => Ok(Acquisition::Acquired(LockGuard::new(
            lock_path.to_path_buf(),
        ))),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(SolorunError::LockError(format!(
            "lost the race to reclaim stale lock '{}'",
            lock_path.display()
        ))),
        Err(e) => Err(SolorunError::LockError(format!(
            "failed to acquire lock '{}' after reclaiming it: {}",
            lock_path.display(),
            e
        ))),
    }
}

/// Report what a lock file currently looks like, probing liveness with
/// `kill(pid, 0)`.
pub fn inspect(lock_path: &Path) -> LockStatus {
    inspect_with_probe(lock_path, &KillProbe)
}

/// Report what a lock file currently looks like without mutating it.
pub fn inspect_with_probe(lock_path: &Path, probe: &dyn ProcessProbe) -> LockStatus {
    // Read without checking existence first, otherwise a lock released
    // in between would read as stale with no holder instead of free.
    let contents = match fs::read_to_string(lock_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return LockStatus::Free,
        Err(_) => return LockStatus::Stale { holder_pid: None },
    };

    match parse_pid(&contents) {
        Some(pid) if probe.is_alive(pid) => LockStatus::HeldByLiveProcess { holder_pid: pid },
        holder_pid => LockStatus::Stale { holder_pid },
    }
}

/// Run `action` only if this process can take the lock, probing liveness
/// with `kill(pid, 0)`.
pub fn run_guarded<F>(lock_path: &Path, label: &str, action: F) -> RunOutcome
where
    F: FnOnce() -> Result<()>,
{
    run_guarded_with_probe(lock_path, label, &KillProbe, action)
}

/// Run `action` only if this process can take the lock.
///
/// This is the composition callers want: acquire, run, always release.
/// A skip is reported with a warning on stderr and in the returned
/// outcome; the action's own failure is logged as an error and folded
/// into `Ran(Err(_))` without ever holding up the release. `label` names
/// the job in log lines.
pub fn run_guarded_with_probe<F>(
    lock_path: &Path,
    label: &str,
    probe: &dyn ProcessProbe,
    action: F,
) -> RunOutcome
where
    F: FnOnce() -> Result<()>,
{
    let guard = match acquire_with_probe(lock_path, probe) {
        Ok(Acquisition::Acquired(guard)) => guard,
        Ok(Acquisition::HeldByLiveProcess { holder_pid }) => {
            eprintln!(
                "Warning: job '{}' is already running (pid {}); skipping this run",
                label, holder_pid
            );
            return RunOutcome::SkippedAlreadyRunning { holder_pid };
        }
        Err(err) => {
            eprintln!(
                "Warning: could not acquire the lock for job '{}': {}; skipping this run",
                label, err
            );
            return RunOutcome::SkippedCannotAcquire(err);
        }
    };

    let result = action();
    if let Err(err) = &result {
        eprintln!("Error: job '{}' failed: {}", label, err);
    }

    // A panicking action unwinds through here and the guard still
    // releases; the explicit drop only bounds the guarded region.
    drop(guard);

    RunOutcome::Ran(result)
}
