//! Configuration schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed LaunchAgent label. Also names the descriptor file.
pub const AGENT_LABEL: &str = "osx-sync-env";

/// Runtime configuration for the agent.
///
/// `program` and `login_shell` describe the running process and are never read
/// from a config file; everything else can be overridden by TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEnvConfig {
    /// Directory holding per-user LaunchAgent descriptors.
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,

    /// Service-control binary.
    #[serde(default = "default_launchctl")]
    pub launchctl: PathBuf,

    /// Directory for rolling log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Absolute path of the running executable.
    #[serde(skip, default = "default_program")]
    pub program: PathBuf,

    /// Value of `SHELL`. Empty when unset.
    #[serde(skip, default = "default_login_shell")]
    pub login_shell: String,
}

fn default_agents_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Library").join("LaunchAgents"))
        .unwrap_or_default()
}

fn default_launchctl() -> PathBuf {
    PathBuf::from("launchctl")
}

fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Library").join("Logs").join(AGENT_LABEL))
        .unwrap_or_else(|| std::env::temp_dir().join(AGENT_LABEL))
}

fn default_program() -> PathBuf {
    std::env::current_exe()
        .or_else(|_| std::path::absolute(std::env::args_os().next().unwrap_or_default()))
        .unwrap_or_default()
}

fn default_login_shell() -> String {
    std::env::var("SHELL").unwrap_or_default()
}

impl Default for SyncEnvConfig {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
            launchctl: default_launchctl(),
            log_dir: default_log_dir(),
            program: default_program(),
            login_shell: default_login_shell(),
        }
    }
}

impl SyncEnvConfig {
    /// Create a config rooted at a custom LaunchAgents directory.
    pub fn with_agents_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            agents_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Set the program path written into the descriptor.
    pub fn program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program = path.into();
        self
    }

    /// Set the login shell written into the descriptor.
    pub fn login_shell(mut self, shell: impl Into<String>) -> Self {
        self.login_shell = shell.into();
        self
    }

    /// Set the service-control binary.
    pub fn launchctl(mut self, path: impl Into<PathBuf>) -> Self {
        self.launchctl = path.into();
        self
    }

    /// Full path of the descriptor file.
    pub fn descriptor_path(&self) -> PathBuf {
        self.agents_dir.join(format!("{AGENT_LABEL}.plist"))
    }

    /// Path of the advisory lock guarding install/upgrade/uninstall.
    pub fn lock_path(&self) -> PathBuf {
        self.agents_dir.join(format!(".{AGENT_LABEL}.lock"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents_dir.as_os_str().is_empty() {
            return Err(ConfigError::HomeDirUnavailable);
        }

        require_absolute("agents_dir", &self.agents_dir)?;
        require_absolute("log_dir", &self.log_dir)?;

        if self.launchctl.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "launchctl".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn require_absolute(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("must be an absolute path, got '{}'", path.display()),
        })
    }
}
