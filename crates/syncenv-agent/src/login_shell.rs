//! Re-running `sync` inside the user's login shell.
//!
//! launchd starts the agent with a bare environment. Running the program
//! through `<shell> -l -c '<program> sync'` lets the shell's profile export
//! the variables that are then pushed into the GUI session.

use std::path::Path;
use std::process::Command;

use crate::error::AgentError;

/// Build the login shell invocation for `program sync`.
pub fn command(shell: &str, program: &Path) -> Result<Command, AgentError> {
    let program = program.to_string_lossy();
    let quoted = shlex::try_quote(&program).map_err(|e| AgentError::Spawn {
        command: format!("{shell} -l -c"),
        reason: format!("cannot quote program path '{program}': {e}"),
    })?;

    let mut cmd = Command::new(shell);
    cmd.arg("-l").arg("-c").arg(format!("{quoted} sync"));
    Ok(cmd)
}

/// Run `program sync` through `shell` and wait for it.
///
/// The child inherits stdout and stderr, so its own completion message and
/// logs reach wherever launchd sends ours.
pub fn run_sync(shell: &str, program: &Path) -> Result<(), AgentError> {
    let mut cmd = command(shell, program)?;
    let cmdline = format!("{shell} -l -c '{} sync'", program.display());

    tracing::info!("Re-running sync through login shell: {}", cmdline);
    let status = cmd.status().map_err(|e| AgentError::Spawn {
        command: cmdline.clone(),
        reason: e.to_string(),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(AgentError::Process {
            command: cmdline,
            status: status.to_string(),
            stderr: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_command_shape() {
        let cmd = command("/bin/zsh", Path::new("/usr/local/bin/osx-sync-env")).unwrap();
        assert_eq!(cmd.get_program(), OsStr::new("/bin/zsh"));

        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], OsStr::new("-l"));
        assert_eq!(args[1], OsStr::new("-c"));
        assert_eq!(
            shlex::split(&args[2].to_string_lossy()).unwrap(),
            vec!["/usr/local/bin/osx-sync-env", "sync"]
        );
    }

    #[test]
    fn test_command_quotes_spaces() {
        let cmd = command("/bin/zsh", Path::new("/Applications/My Tools/osx-sync-env")).unwrap();
        let last = cmd.get_args().last().unwrap().to_string_lossy().into_owned();
        assert_eq!(
            shlex::split(&last).unwrap(),
            vec!["/Applications/My Tools/osx-sync-env", "sync"]
        );
    }

    #[test]
    fn test_command_rejects_nul() {
        let result = command("/bin/zsh", Path::new("/bin/a\0b"));
        assert!(matches!(result, Err(AgentError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_sync_success() {
        // `true sync` exits zero under any POSIX shell.
        assert!(run_sync("/bin/sh", Path::new("true")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_sync_failure() {
        let err = run_sync("/bin/sh", Path::new("false")).unwrap_err();
        assert!(matches!(err, AgentError::Process { .. }));
    }

    #[test]
    fn test_run_sync_missing_shell() {
        let err = run_sync("/nonexistent/shell", Path::new("true")).unwrap_err();
        assert!(matches!(err, AgentError::Spawn { .. }));
    }
}
