//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::{AGENT_LABEL, SyncEnvConfig};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "OSX_SYNC_ENV_CONFIG";

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the configuration for this process.
    ///
    /// `$OSX_SYNC_ENV_CONFIG` must point at an existing file when set. Otherwise
    /// `~/.config/osx-sync-env/config.toml` is used if present, and the
    /// built-in defaults if not.
    pub fn resolve() -> Result<SyncEnvConfig, ConfigError> {
        let config = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(Self::expand_path(&path.to_string_lossy()));
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                Self::load(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.is_file() => Self::load(&path)?,
                _ => SyncEnvConfig::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Default location of the optional config file.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join(AGENT_LABEL).join("config.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<SyncEnvConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<SyncEnvConfig, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: SyncEnvConfig = toml::from_str(&expanded)?;

        config.agents_dir = Self::expand_path_buf(&config.agents_dir);
        config.log_dir = Self::expand_path_buf(&config.log_dir);
        config.launchctl = Self::expand_path_buf(&config.launchctl);

        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/Library`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }
}
