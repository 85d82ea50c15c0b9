//! Error types.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result alias for hosts file operations.
pub type Result<T> = std::result::Result<T, HostsError>;

/// Errors returned by the updater and verifier.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Filesystem I/O failed (typically `PermissionDenied` on the hosts file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The hosts file does not exist.
    #[error("hosts not found: {}", path.display())]
    HostsNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// Invalid configuration values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl HostsError {
    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

/// Why an external lookup tool produced no output.
///
/// These never leave the resolver layer; they are logged and treated as an
/// empty answer.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program was not found on `PATH`.
    #[error("{program} is not installed")]
    NotInstalled {
        /// Program name.
        program: String,
    },

    /// The program could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The program did not exit before the deadline and was killed.
    #[error("{program} timed out after {secs}s")]
    TimedOut {
        /// Program name.
        program: String,
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// The program exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit status.
        status: ExitStatus,
    },
}
