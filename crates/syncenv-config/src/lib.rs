//! # osx-sync-env Config
//!
//! Configuration for the osx-sync-env agent. A single [`SyncEnvConfig`] is
//! resolved once at process entry and handed to everything that needs the
//! descriptor path, the `launchctl` binary or the login shell.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{CONFIG_ENV_VAR, ConfigLoader};
pub use schema::{AGENT_LABEL, SyncEnvConfig};
