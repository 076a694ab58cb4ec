//! Error types for hostprobe operations.
//!
//! This module defines [`HostProbeError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every fatal condition is detected and reported at the line that found
//!   it; there is no retry logic and no central aggregation.
//! - Capability absence is never an error — it is a boolean fact that
//!   drives heuristic selection.
//! - Use `anyhow::Error` (via `HostProbeError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hostprobe operations.
///
/// Every variant is fatal: the process prints the message with a `[-]`
/// prefix and exits with code 1.
#[derive(Debug, Error)]
pub enum HostProbeError {
    /// Probe directory does not exist or is not a directory.
    #[error("Dir '{}' does not exist or is not a directory", path.display())]
    ProbeDirInvalid { path: PathBuf },

    /// The write test refuses to run in a group- or world-writable directory.
    #[error(
        "Cannot run write test in a globally writable dir. \
         Make '{}' writable for owner only and try again",
        path.display()
    )]
    GloballyWritableDir { path: PathBuf },

    /// A permission class outside {owner, group, other} was requested.
    #[error("Invalid permission class requested: '{class}'. Choose one of [owner, group, other]")]
    InvalidPermClass { class: String },

    /// The chmod probe could not restore the directory's original mode.
    /// Leaving a directory world-writable is a security regression.
    #[error("Could not restore mode {mode:04o} on dir '{}'", path.display())]
    PermissionRestoreFailed { path: PathBuf, mode: u32 },

    /// The write-test artifact could not be removed.
    #[error("File '{}' could not be deleted. Please remove it manually", path.display())]
    CleanupFailed { path: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for hostprobe operations.
pub type Result<T> = std::result::Result<T, HostProbeError>;
