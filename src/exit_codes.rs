//! Exit code constants for the solorun CLI.
//!
//! - 0: Success, including runs skipped because another instance holds the lock
//! - 1: User error (bad args, invalid config)
//! - 2: Job failure (the guarded command ran and did not succeed)
//! - 3: Lock failure (a lock file could not be created or removed)
//!
//! Skipped runs exiting 0 is deliberate: schedulers fire on a fixed cadence
//! and an overlap is a normal event, not something to alert on.

/// Successful execution, or a run skipped because the lock is held.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unknown job, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Job failure: the guarded command exited non-zero or could not start.
pub const JOB_FAILURE: i32 = 2;

/// Lock failure: a lock file could not be created, reclaimed, or removed.
pub const LOCK_FAILURE: i32 = 3;
