//! Result types for acquisition, inspection, and guarded runs.

use super::guard::LockGuard;
use crate::error::SolorunError;

/// Outcome of a lock acquisition attempt.
///
/// Acquisition failing for filesystem reasons is an `Err` at the call
/// site; both variants here are successful answers to "may I run?".
#[derive(Debug)]
pub enum Acquisition {
    /// The lock file was created and is ours until the guard releases it.
    Acquired(LockGuard),

    /// The lock file belongs to a process that is still running.
    HeldByLiveProcess { holder_pid: u32 },
}

/// Outcome of a guarded run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The lock was acquired and the action ran to completion; its own
    /// result is carried through unchanged.
    Ran(Result<(), SolorunError>),

    /// Another live process holds the lock; the action was not run.
    SkippedAlreadyRunning { holder_pid: u32 },

    /// The lock could not be acquired at all; the action was not run.
    SkippedCannotAcquire(SolorunError),
}

/// What a lock file looks like from the outside, without touching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// No lock file at the path.
    Free,

    /// The recorded holder is alive; the lock is genuinely held.
    HeldByLiveProcess { holder_pid: u32 },

    /// The lock file exists but its holder is gone. `holder_pid` is
    /// `None` when the file does not contain a readable PID.
    Stale { holder_pid: Option<u32> },
}

impl LockStatus {
    /// The PID recorded in the lock file, if one could be read.
    pub fn holder_pid(&self) -> Option<u32> {
        match self {
            LockStatus::Free => None,
            LockStatus::HeldByLiveProcess { holder_pid } => Some(*holder_pid),
            LockStatus::Stale { holder_pid } => *holder_pid,
        }
    }
}

impl std::fmt::Display for LockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockStatus::Free => write!(f, "free"),
            LockStatus::HeldByLiveProcess { holder_pid } => {
                write!(f, "held by live process (pid {})", holder_pid)
            }
            LockStatus::Stale {
                holder_pid: Some(pid),
            } => write!(f, "stale (holder pid {} is gone)", pid),
            LockStatus::Stale { holder_pid: None } => {
                write!(f, "stale (no readable holder pid)")
            }
        }
    }
}
