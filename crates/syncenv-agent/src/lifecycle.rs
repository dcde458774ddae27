//! Lifecycle controller: install, uninstall, upgrade and sync.
//!
//! The agent is either `Absent` or `Installed`. That state is never cached;
//! every operation observes it from the descriptor file and infers the
//! service registration from `launchctl` exit codes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use syncenv_config::SyncEnvConfig;

use crate::env;
use crate::error::AgentError;
use crate::launchd::{AgentDescriptor, ServiceNotifier};
use crate::lock::InstallLock;
use crate::login_shell;

/// Observed state of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Absent,
    Installed,
    /// A directory sits where the descriptor belongs.
    Misconfigured,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentState::Absent => write!(f, "absent"),
            AgentState::Installed => write!(f, "installed"),
            AgentState::Misconfigured => write!(f, "misconfigured"),
        }
    }
}

/// Agent status information.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub state: AgentState,
    pub descriptor: String,
}

/// Outcome of pushing variables into the GUI session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Variables `launchctl setenv` accepted.
    pub applied: usize,
    /// Names of variables that could not be set.
    pub failed: Vec<String>,
}

/// How a `sync` request was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Variables were pushed by this process.
    Applied(SyncReport),
    /// A login shell child ran `sync` on our behalf.
    Delegated { shell: String },
}

/// Drives the descriptor file and the service notifier through each operation.
pub struct LifecycleController<'a, N> {
    config: &'a SyncEnvConfig,
    descriptor: AgentDescriptor,
    notifier: N,
}

impl<'a, N: ServiceNotifier> LifecycleController<'a, N> {
    pub fn new(config: &'a SyncEnvConfig, notifier: N) -> Self {
        Self {
            config,
            descriptor: AgentDescriptor::from_config(config),
            notifier,
        }
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    /// Create the descriptor and register it.
    ///
    /// Fails with [`AgentError::AlreadyExists`] when a descriptor is present.
    /// A failed load leaves the new file on disk.
    pub fn install(&self) -> Result<(), AgentError> {
        let _lock = self.lock()?;
        let path = self.descriptor.path();

        if self.descriptor.exists()? {
            return Err(AgentError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        self.write_descriptor()?;

        // Nothing can be loaded from a path that did not exist, so the reload
        // reduces to its load half.
        self.notifier.load(path)?;

        info!("Installed LaunchAgent: {}", path.display());
        Ok(())
    }

    /// Deregister the agent and delete its descriptor.
    ///
    /// The file is only removed once `unload` succeeded.
    pub fn uninstall(&self) -> Result<(), AgentError> {
        let _lock = self.lock()?;
        let path = self.descriptor.path();

        self.notifier.unload(path)?;
        self.descriptor.delete()?;

        info!("Uninstalled LaunchAgent: {}", path.display());
        Ok(())
    }

    /// Replace the descriptor with one rendered from the current program path
    /// and login shell, then reload it.
    pub fn upgrade(&self) -> Result<(), AgentError> {
        let _lock = self.lock()?;
        let path = self.descriptor.path();

        if !self.descriptor.exists()? {
            return Err(AgentError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if self.descriptor.is_directory()? {
            return Err(AgentError::IsADirectory {
                path: path.to_path_buf(),
            });
        }

        // TODO: verify the descriptor carries our label before replacing it.
        self.descriptor.delete()?;
        self.write_descriptor()?;
        self.notifier.reload(path)?;

        info!("Upgraded LaunchAgent: {}", path.display());
        Ok(())
    }

    /// Push the current process environment into the GUI session.
    pub fn sync(&self) -> SyncReport {
        self.sync_vars(env::snapshot())
    }

    /// Push `vars` into the GUI session, one `setenv` per entry.
    ///
    /// A failed variable is logged and recorded, never fatal.
    pub fn sync_vars(&self, vars: HashMap<String, String>) -> SyncReport {
        let mut report = SyncReport::default();

        for (key, value) in &vars {
            match self.notifier.set_env(key, value) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!("Error setting env variable '{}': {}", key, e);
                    report.failed.push(key.clone());
                }
            }
        }

        report.failed.sort();
        info!(
            "Synced {} environment variables ({} failed)",
            report.applied,
            report.failed.len()
        );
        report
    }

    /// Sync from inside `shell` started as a login shell.
    ///
    /// With an empty shell there is nothing to re-run through, so the current
    /// environment is synced directly.
    pub fn sync_via_login_shell(&self, shell: &str) -> Result<SyncOutcome, AgentError> {
        if shell.is_empty() {
            warn!("No login shell known, syncing the current environment directly");
            return Ok(SyncOutcome::Applied(self.sync()));
        }

        login_shell::run_sync(shell, &self.config.program)?;
        Ok(SyncOutcome::Delegated {
            shell: shell.to_string(),
        })
    }

    /// Report what currently sits at the descriptor path.
    pub fn status(&self) -> Result<AgentStatus, AgentError> {
        let state = if !self.descriptor.exists()? {
            AgentState::Absent
        } else if self.descriptor.is_directory()? {
            AgentState::Misconfigured
        } else {
            AgentState::Installed
        };

        Ok(AgentStatus {
            state,
            descriptor: self.descriptor.path().display().to_string(),
        })
    }

    fn write_descriptor(&self) -> Result<(), AgentError> {
        self.descriptor
            .create(&self.config.login_shell, &self.config.program)
    }

    fn lock(&self) -> Result<InstallLock, AgentError> {
        InstallLock::acquire(self.config.lock_path())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
