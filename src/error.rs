//! Error types for stt
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (empty/duplicate name, nothing to act on)
//! - 3: Blocked by tracker state (task running, export blocked)
//! - 4: Operation failed (file I/O)

use thiserror::Error;

/// Exit codes for the stt binary
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const STATE_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for stt operations
///
/// Every variant is a user-recoverable precondition violation; the UI shows
/// the message in the status line and skips the operation.
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Activity name cannot be empty")]
    EmptyName,

    #[error("Activity already exists: {0}")]
    DuplicateName(String),

    #[error("No activity is currently running")]
    NoActiveTask,

    #[error("No records to export")]
    EmptyLog,

    // Blocked by tracker state (exit code 3)
    #[error("Activity is currently running: {0}")]
    ActivityInUse(String),

    #[error("An activity is already running: {0}")]
    TaskAlreadyRunning(String),

    #[error("End the running activity before exporting")]
    ExportBlocked,

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EmptyName
            | Error::DuplicateName(_)
            | Error::NoActiveTask
            | Error::EmptyLog => exit_codes::USER_ERROR,

            Error::ActivityInUse(_) | Error::TaskAlreadyRunning(_) | Error::ExportBlocked => {
                exit_codes::STATE_BLOCKED
            }

            Error::Io(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for stt operations
pub type Result<T> = std::result::Result<T, Error>;
