//! Error types for the solorun CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for solorun operations.
///
/// Each variant maps to a specific exit code so that schedulers can tell
/// configuration mistakes apart from failing jobs and lock trouble. A run
/// that is merely skipped because another instance holds the lock is not
/// an error at all; it exits with code 0.
#[derive(Error, Debug)]
pub enum SolorunError {
    /// User provided invalid arguments or the configuration is invalid.
    #[error("{0}")]
    UserError(String),

    /// The guarded command ran (or failed to start) and did not succeed.
    #[error("{0}")]
    JobError(String),

    /// A lock file could not be created, reclaimed, or removed.
    #[error("{0}")]
    LockError(String),
}

impl SolorunError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SolorunError::UserError(_) => exit_codes::USER_ERROR,
            SolorunError::JobError(_) => exit_codes::JOB_FAILURE,
            SolorunError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for solorun operations.
pub type Result<T> = std::result::Result<T, SolorunError>;
