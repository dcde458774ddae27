//! Exclusive advisory lock around descriptor check-then-act sequences.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::AgentError;

/// Held for the duration of install, upgrade and uninstall.
///
/// The lock file is created on demand and left in place; only the lock on it
/// is released on drop.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: PathBuf,
}

impl InstallLock {
    /// Block until the lock at `path` is ours.
    ///
    /// Failing to create or open the lock file is an [`AgentError::Io`];
    /// only a failed `flock` is an [`AgentError::Lock`].
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        if let Err(source) = file.lock_exclusive() {
            return Err(AgentError::Lock { path, source });
        }
        debug!("Acquired install lock: {}", path.display());

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!("Released install lock: {}", self.path().display()),
            Err(e) => warn!("Failed to release install lock {}: {}", self.path().display(), e),
        }
    }
}
