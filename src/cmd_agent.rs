//! Agent subcommand handlers for osx-sync-env.

use tracing::{info, warn};

use syncenv_agent::{Launchctl, LifecycleController, ServiceNotifier, SyncOutcome};
use syncenv_config::SyncEnvConfig;

use crate::cli::{Cli, Commands, OutputFormat};

/// Handle one invocation.
pub(crate) fn handle_command(
    cli: Cli,
    config: &SyncEnvConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = LifecycleController::new(config, Launchctl::from_config(config));

    match cli.command {
        Commands::Install => agent_install(&controller),
        Commands::Uninstall => agent_uninstall(&controller),
        Commands::Upgrade => agent_upgrade(&controller),
        Commands::Sync => {
            let shell = cli
                .through_shell
                .then(|| cli.login_shell.as_deref().unwrap_or(&config.login_shell));
            agent_sync(&controller, shell)
        }
        Commands::Status { format } => agent_status(&controller, format),
    }
}

/// Install the LaunchAgent.
fn agent_install<N: ServiceNotifier>(
    controller: &LifecycleController<'_, N>,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.install()?;
    println!(
        "Successfully loaded and installed {} into launchctl",
        controller.descriptor().path().display()
    );
    Ok(())
}

/// Uninstall the LaunchAgent.
fn agent_uninstall<N: ServiceNotifier>(
    controller: &LifecycleController<'_, N>,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.uninstall()?;
    println!(
        "Successfully unloaded and uninstalled {} from launchctl",
        controller.descriptor().path().display()
    );
    Ok(())
}

/// Replace the descriptor and reload it.
fn agent_upgrade<N: ServiceNotifier>(
    controller: &LifecycleController<'_, N>,
) -> Result<(), Box<dyn std::error::Error>> {
    controller.upgrade()?;
    println!(
        "Successfully upgraded and reloaded {} into launchctl",
        controller.descriptor().path().display()
    );
    Ok(())
}

/// Push the environment into the GUI context, optionally via the login shell.
fn agent_sync<N: ServiceNotifier>(
    controller: &LifecycleController<'_, N>,
    login_shell: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match login_shell {
        Some(shell) => controller.sync_via_login_shell(shell)?,
        None => SyncOutcome::Applied(controller.sync()),
    };

    match outcome {
        SyncOutcome::Applied(report) => {
            if !report.failed.is_empty() {
                warn!(
                    "{} variable(s) could not be set: {}",
                    report.failed.len(),
                    report.failed.join(", ")
                );
            }
            println!(
                "Environment variables reloaded. Now relaunch your GUI apps to make them aware."
            );
        }
        SyncOutcome::Delegated { shell } => {
            info!("Sync completed through login shell {}", shell);
        }
    }

    Ok(())
}

/// Show the descriptor state.
fn agent_status<N: ServiceNotifier>(
    controller: &LifecycleController<'_, N>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = controller.status()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => {
            println!("LaunchAgent: {}", status.state);
            println!("Descriptor:  {}", status.descriptor);
        }
    }

    Ok(())
}
