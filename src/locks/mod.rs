//! PID-file locking for single-instance job runs.
//!
//! This module implements the mutual exclusion that keeps a scheduled job
//! from overlapping itself across independently started processes: cron
//! firing again while the previous run is still going, two entries that
//! must never run together, or an operator starting a job by hand.
//!
//! # Lock Files
//!
//! A lock is a small file whose existence means "held" and whose entire
//! content is the holder's decimal PID. Lock files are created with
//! **create_new** semantics (exclusive create) so that only one process
//! can acquire a given lock path at a time. Acquisition never blocks:
//! a caller that loses simply does not run this cycle.
//!
//! # Staleness
//!
//! A lock whose recorded PID no longer names a running process is stale:
//! the holder died without releasing. Any acquirer may verify that with a
//! liveness probe (signal 0) and reclaim the file. There is no time-based
//! expiry; a lock stays held exactly as long as its holder process lives.
//!
//! # RAII Guards
//!
//! Acquired locks are managed through RAII guard objects that release on
//! drop, so every exit path from a guarded region (return, `?`, panic)
//! removes the lock file. If deletion fails during drop, a warning is
//! printed but the program does not crash.

mod guard;
mod operations;
mod probe;
mod types;


// Re-export public API
pub use guard::LockGuard;
pub use operations::{
    acquire, acquire_with_probe, inspect, inspect_with_probe, read_pid, run_guarded,
    run_guarded_with_probe,
};
pub use probe::{KillProbe, ProcessProbe};
pub use types::{Acquisition, LockStatus, RunOutcome};
