//! macOS LaunchAgent management.
//!
//! This module writes the per-user LaunchAgent descriptor that re-runs
//! `osx-sync-env sync` at login, and talks to `launchctl` to register it and
//! to push variables into the GUI session.

mod launchd_descriptor;
mod launchd_notifier;

pub use launchd_descriptor::AgentDescriptor;
pub use launchd_notifier::{Launchctl, ServiceNotifier};

#[cfg(test)]
#[path = "launchd_tests.rs"]
mod tests;
