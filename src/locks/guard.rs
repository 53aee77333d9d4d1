//! RAII lock guard implementation.

use crate::error::{Result, SolorunError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// RAII guard for an acquired PID lock file.
///
/// When dropped, the lock file is automatically deleted, so the lock is
/// released on every exit path from the guarded region. If deletion fails,
/// a warning is printed but no panic occurs.
///
/// Release is idempotent: a lock file that is already gone counts as
/// released, whether the deletion happens through [`LockGuard::release`]
/// or through drop.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock file.
    path: PathBuf,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    /// Create a new lock guard for the given path.
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Manually release the lock.
    ///
    /// This is useful when the caller wants to release before the guard
    /// goes out of scope and handle removal errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SolorunError::LockError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}
