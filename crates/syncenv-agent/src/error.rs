//! Agent lifecycle errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing the LaunchAgent or syncing variables.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Install found a descriptor already in place.
    #[error("Descriptor '{}' already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    /// Upgrade found no descriptor to replace.
    #[error("Descriptor '{}' does not exist, run install first", .path.display())]
    NotFound { path: PathBuf },

    /// The descriptor path is occupied by a directory.
    #[error("Descriptor '{}' is a directory, refusing to touch it", .path.display())]
    IsADirectory { path: PathBuf },

    /// An external command ran but exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Process {
        command: String,
        status: String,
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("Failed to execute `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The advisory install lock could not be taken.
    #[error("Failed to lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
