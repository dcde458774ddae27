//! osx-sync-env - sync shell environment variables into the macOS GUI context
//!
//! Main entry point for the osx-sync-env CLI.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use syncenv_config::{AGENT_LABEL, ConfigLoader};

mod cli;
mod cmd_agent;

use cli::Cli;

/// Initialize tracing with console and, when possible, file output.
///
/// `sync` runs from launchd at login with nobody watching the console, so a
/// daily rolling log under `log_dir` keeps a record of what it did.
fn init_tracing(log_dir: Option<&Path>) {
    let file_appender = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(AGENT_LABEL)
            .filename_suffix("log")
            .max_log_files(7)
            .build(dir)
            .ok()
    });

    let file_layer = file_appender.map(|appender| {
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        // Keep the worker alive for the program duration.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        fmt::layer().with_writer(non_blocking).with_ansi(false)
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = ConfigLoader::resolve();
    init_tracing(config.as_ref().ok().map(|c| c.log_dir.as_path()));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| cmd_agent::handle_command(cli, &config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(e.as_ref(), &mut std::io::stderr());
            ExitCode::FAILURE
        }
    }
}

/// Log a failed command and print it to `out` independent of `RUST_LOG`.
fn report_error(err: &dyn std::error::Error, out: &mut impl Write) {
    error!("{}", err);
    let _ = writeln!(out, "Error: {err}");
}
