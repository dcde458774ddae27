//! Service notifier: the `launchctl` operations the lifecycle depends on.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use syncenv_config::SyncEnvConfig;

use crate::error::AgentError;

/// Per-user service manager operations.
pub trait ServiceNotifier {
    /// Register the agent described by `plist`.
    fn load(&self, plist: &Path) -> Result<(), AgentError>;

    /// Deregister the agent described by `plist`.
    fn unload(&self, plist: &Path) -> Result<(), AgentError>;

    /// Unload then load. A failed unload stops here without loading.
    fn reload(&self, plist: &Path) -> Result<(), AgentError> {
        self.unload(plist)?;
        self.load(plist)
    }

    /// Set one variable in the GUI session environment.
    fn set_env(&self, key: &str, value: &str) -> Result<(), AgentError>;
}

impl<T: ServiceNotifier + ?Sized> ServiceNotifier for &T {
    fn load(&self, plist: &Path) -> Result<(), AgentError> {
        (**self).load(plist)
    }

    fn unload(&self, plist: &Path) -> Result<(), AgentError> {
        (**self).unload(plist)
    }

    fn reload(&self, plist: &Path) -> Result<(), AgentError> {
        (**self).reload(plist)
    }

    fn set_env(&self, key: &str, value: &str) -> Result<(), AgentError> {
        (**self).set_env(key, value)
    }
}

/// [`ServiceNotifier`] backed by the `launchctl` binary.
#[derive(Debug, Clone)]
pub struct Launchctl {
    binary: PathBuf,
}

impl Launchctl {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &SyncEnvConfig) -> Self {
        Self::new(config.launchctl.clone())
    }

    /// Run `launchctl` with `args`, mapping a nonzero exit to [`AgentError::Process`].
    ///
    /// With `redact_last`, the final argument is left out of the command text
    /// carried by errors.
    fn run(&self, args: &[&OsStr], redact_last: bool) -> Result<(), AgentError> {
        let shown = if redact_last {
            &args[..args.len().saturating_sub(1)]
        } else {
            args
        };
        let command = self.describe(shown);

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| AgentError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(AgentError::Process {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn describe(&self, args: &[&OsStr]) -> String {
        let mut parts = vec![self.binary.to_string_lossy().into_owned()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

impl ServiceNotifier for Launchctl {
    fn load(&self, plist: &Path) -> Result<(), AgentError> {
        self.run(&[OsStr::new("load"), plist.as_os_str()], false)?;
        tracing::info!("Loaded LaunchAgent: {}", plist.display());
        Ok(())
    }

    fn unload(&self, plist: &Path) -> Result<(), AgentError> {
        self.run(&[OsStr::new("unload"), plist.as_os_str()], false)?;
        tracing::info!("Unloaded LaunchAgent: {}", plist.display());
        Ok(())
    }

    fn set_env(&self, key: &str, value: &str) -> Result<(), AgentError> {
        // Values can hold secrets; keep them out of errors and logs.
        self.run(&[OsStr::new("setenv"), OsStr::new(key), OsStr::new(value)], true)?;
        tracing::debug!("launchctl setenv {}", key);
        Ok(())
    }
}
