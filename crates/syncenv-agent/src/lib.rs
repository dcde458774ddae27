//! # osx-sync-env Agent
//!
//! Keeps the macOS GUI session environment in step with the login shell.
//!
//! ## Features
//!
//! - Per-user LaunchAgent descriptor that runs `sync` at login
//! - Install, upgrade and uninstall of that descriptor via `launchctl`
//! - `launchctl setenv` for every variable of the current environment
//! - Advisory lock around descriptor check-then-act sequences
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syncenv_agent::{Launchctl, LifecycleController};
//! use syncenv_config::ConfigLoader;
//!
//! let config = ConfigLoader::resolve()?;
//! let controller = LifecycleController::new(&config, Launchctl::from_config(&config));
//! controller.install()?;
//! ```

pub mod env;
pub mod error;
pub mod launchd;
pub mod lifecycle;
pub mod lock;
pub mod login_shell;

// Re-exports
pub use error::AgentError;
pub use launchd::{AgentDescriptor, Launchctl, ServiceNotifier};
pub use lifecycle::{AgentState, AgentStatus, LifecycleController, SyncOutcome, SyncReport};
pub use lock::InstallLock;
