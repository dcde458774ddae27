//! CLI definitions for osx-sync-env.

use clap::{Parser, Subcommand, ValueEnum};

/// osx-sync-env CLI.
#[derive(Parser)]
#[command(name = "osx-sync-env")]
#[command(about = "osx-sync-env is an easy to use environment variable manager")]
#[command(long_about = "An easy to use environment variable manager. It loads the environment
variables exported in the user shell into the macOS GUI app context
using launchctl.")]
#[command(version)]
pub(crate) struct Cli {
    /// Run the command through the login shell given with `-l`
    #[arg(short = 'c', global = true, hide = true)]
    pub through_shell: bool,

    /// Login shell used by `-c`
    #[arg(short = 'l', value_name = "SHELL", global = true, hide = true)]
    pub login_shell: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Installs the sync on user login
    #[command(long_about = "Creates a LaunchAgent that runs on user login. The agent
launches osx-sync-env with the \"sync\" command, which sets up the GUI app
context environment variables.")]
    Install,

    /// Removes the sync from the user's login
    #[command(long_about = "Removes the LaunchAgent from the user's login. Environment
variables already exported stay until the next logout and login.")]
    Uninstall,

    /// Upgrades the LaunchAgent descriptor to the most recent version
    #[command(long_about = "Replaces the LaunchAgent descriptor with a newly rendered one
and reloads it. Used when the program moved or the descriptor format changed.")]
    Upgrade,

    /// Exports the env. vars. of the current shell into the GUI context
    #[command(long_about = "Uses \"launchctl setenv\" to synchronize environment variables
set in the current shell into the macOS GUI application context.")]
    Sync,

    /// Shows whether the LaunchAgent descriptor is installed
    Status {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}
