use super::*;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Call {
    Load(PathBuf),
    Unload(PathBuf),
    SetEnv(String, String),
}

/// Notifier fake that records every call and fails on request.
#[derive(Default)]
struct RecordingNotifier {
    calls: RefCell<Vec<Call>>,
    fail_load: bool,
    fail_unload: bool,
    fail_keys: HashSet<String>,
}

impl RecordingNotifier {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn failure(command: &str) -> AgentError {
        AgentError::Process {
            command: command.to_string(),
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        }
    }
}

impl ServiceNotifier for RecordingNotifier {
    fn load(&self, plist: &Path) -> Result<(), AgentError> {
        self.calls.borrow_mut().push(Call::Load(plist.to_path_buf()));
        if self.fail_load {
            return Err(Self::failure("launchctl load"));
        }
        Ok(())
    }

    fn unload(&self, plist: &Path) -> Result<(), AgentError> {
        self.calls
            .borrow_mut()
            .push(Call::Unload(plist.to_path_buf()));
        if self.fail_unload {
            return Err(Self::failure("launchctl unload"));
        }
        Ok(())
    }

    fn set_env(&self, key: &str, value: &str) -> Result<(), AgentError> {
        self.calls
            .borrow_mut()
            .push(Call::SetEnv(key.to_string(), value.to_string()));
        if self.fail_keys.contains(key) {
            return Err(Self::failure("launchctl setenv"));
        }
        Ok(())
    }
}

fn test_config(dir: &TempDir) -> SyncEnvConfig {
    SyncEnvConfig::with_agents_dir(dir.path().join("LaunchAgents"))
        .program("/usr/local/bin/tool")
        .login_shell("/bin/zsh")
}

fn read_descriptor(config: &SyncEnvConfig) -> String {
    std::fs::read_to_string(config.descriptor_path()).unwrap()
}

#[test]
fn test_install_creates_descriptor_and_loads() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();
    let controller = LifecycleController::new(&config, &notifier);

    controller.install().unwrap();

    let content = read_descriptor(&config);
    assert!(content.contains("<string>/usr/local/bin/tool</string>"));
    assert!(content.contains("<string>/bin/zsh</string>"));
    assert_eq!(notifier.calls(), vec![Call::Load(config.descriptor_path())]);
}

#[test]
fn test_install_twice_fails_and_keeps_content() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();
    LifecycleController::new(&config, &notifier).install().unwrap();
    let before = read_descriptor(&config);

    let moved = config.clone().program("/opt/other/tool");
    let err = LifecycleController::new(&moved, &notifier)
        .install()
        .unwrap_err();

    assert!(matches!(err, AgentError::AlreadyExists { .. }));
    assert_eq!(read_descriptor(&config), before);
    assert_eq!(notifier.calls().len(), 1);
}

#[test]
fn test_install_load_failure_leaves_descriptor() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier {
        fail_load: true,
        ..Default::default()
    };

    let err = LifecycleController::new(&config, &notifier)
        .install()
        .unwrap_err();

    assert!(matches!(err, AgentError::Process { .. }));
    assert!(config.descriptor_path().exists());
}

#[test]
fn test_install_then_uninstall_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();
    let controller = LifecycleController::new(&config, &notifier);

    controller.install().unwrap();
    controller.uninstall().unwrap();

    let path = config.descriptor_path();
    assert!(!path.exists());
    assert_eq!(
        notifier.calls(),
        vec![Call::Load(path.clone()), Call::Unload(path)]
    );
}

#[test]
fn test_uninstall_unload_failure_keeps_descriptor() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    LifecycleController::new(&config, RecordingNotifier::default())
        .install()
        .unwrap();

    let notifier = RecordingNotifier {
        fail_unload: true,
        ..Default::default()
    };
    let err = LifecycleController::new(&config, &notifier)
        .uninstall()
        .unwrap_err();

    assert!(matches!(err, AgentError::Process { .. }));
    assert!(config.descriptor_path().exists());
}

#[test]
fn test_uninstall_without_descriptor() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();

    let err = LifecycleController::new(&config, &notifier)
        .uninstall()
        .unwrap_err();

    assert!(matches!(err, AgentError::Io(_)));
    assert_eq!(notifier.calls(), vec![Call::Unload(config.descriptor_path())]);
}

#[test]
fn test_upgrade_missing_descriptor() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();

    let err = LifecycleController::new(&config, &notifier)
        .upgrade()
        .unwrap_err();

    assert!(matches!(err, AgentError::NotFound { .. }));
    assert!(notifier.calls().is_empty());
}

#[test]
fn test_upgrade_directory_untouched() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let path = config.descriptor_path();
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("keep.txt"), "keep").unwrap();
    let notifier = RecordingNotifier::default();

    let err = LifecycleController::new(&config, &notifier)
        .upgrade()
        .unwrap_err();

    assert!(matches!(err, AgentError::IsADirectory { .. }));
    assert!(path.is_dir());
    assert_eq!(std::fs::read_to_string(path.join("keep.txt")).unwrap(), "keep");
    assert!(notifier.calls().is_empty());
}

#[test]
fn test_upgrade_rewrites_and_reloads() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    LifecycleController::new(&config, RecordingNotifier::default())
        .install()
        .unwrap();

    let upgraded = config.clone().program("/opt/new/tool").login_shell("/bin/bash");
    let notifier = RecordingNotifier::default();
    LifecycleController::new(&upgraded, &notifier)
        .upgrade()
        .unwrap();

    let content = read_descriptor(&config);
    assert_eq!(
        content,
        AgentDescriptor::render("/bin/bash", Path::new("/opt/new/tool"))
    );

    let path = config.descriptor_path();
    assert_eq!(
        notifier.calls(),
        vec![Call::Unload(path.clone()), Call::Load(path)]
    );
}

#[test]
fn test_upgrade_unload_failure_skips_load() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    LifecycleController::new(&config, RecordingNotifier::default())
        .install()
        .unwrap();

    let notifier = RecordingNotifier {
        fail_unload: true,
        ..Default::default()
    };
    let err = LifecycleController::new(&config, &notifier)
        .upgrade()
        .unwrap_err();

    assert!(matches!(err, AgentError::Process { .. }));
    assert_eq!(notifier.calls(), vec![Call::Unload(config.descriptor_path())]);
    // No rollback: the freshly written descriptor stays.
    assert!(config.descriptor_path().is_file());
}

#[test]
fn test_sync_sets_every_variable() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();
    let controller = LifecycleController::new(&config, &notifier);

    let vars = HashMap::from([
        ("A".to_string(), "1".to_string()),
        ("B".to_string(), "2".to_string()),
    ]);
    let report = controller.sync_vars(vars);

    assert_eq!(report.applied, 2);
    assert!(report.failed.is_empty());

    let calls = notifier.calls();
    assert_eq!(calls.len(), 2);
    let calls: HashSet<Call> = calls.into_iter().collect();
    assert!(calls.contains(&Call::SetEnv("A".into(), "1".into())));
    assert!(calls.contains(&Call::SetEnv("B".into(), "2".into())));
}

#[test]
fn test_sync_tolerates_failed_variable() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier {
        fail_keys: HashSet::from(["A".to_string()]),
        ..Default::default()
    };
    let controller = LifecycleController::new(&config, &notifier);

    let vars = HashMap::from([
        ("A".to_string(), "1".to_string()),
        ("B".to_string(), "2".to_string()),
    ]);
    let report = controller.sync_vars(vars);

    assert_eq!(notifier.calls().len(), 2);
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, vec!["A".to_string()]);
}

#[test]
fn test_sync_empty_environment() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();

    let report = LifecycleController::new(&config, &notifier).sync_vars(HashMap::new());

    assert_eq!(report, SyncReport::default());
    assert!(notifier.calls().is_empty());
}

#[test]
fn test_sync_via_empty_shell_syncs_directly() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();

    let outcome = LifecycleController::new(&config, &notifier)
        .sync_via_login_shell("")
        .unwrap();

    match outcome {
        SyncOutcome::Applied(report) => {
            assert_eq!(report.applied + report.failed.len(), notifier.calls().len());
        }
        other => panic!("expected a direct sync, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_sync_via_login_shell_delegates() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir).program("true");
    let notifier = RecordingNotifier::default();

    let outcome = LifecycleController::new(&config, &notifier)
        .sync_via_login_shell("/bin/sh")
        .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Delegated {
            shell: "/bin/sh".to_string()
        }
    );
    assert!(notifier.calls().is_empty());
}

#[test]
fn test_status_transitions() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let notifier = RecordingNotifier::default();
    let controller = LifecycleController::new(&config, &notifier);

    assert_eq!(controller.status().unwrap().state, AgentState::Absent);
    controller.install().unwrap();
    assert_eq!(controller.status().unwrap().state, AgentState::Installed);
    controller.uninstall().unwrap();
    assert_eq!(controller.status().unwrap().state, AgentState::Absent);

    std::fs::create_dir_all(config.descriptor_path()).unwrap();
    let status = controller.status().unwrap();
    assert_eq!(status.state, AgentState::Misconfigured);
    assert_eq!(status.descriptor, config.descriptor_path().display().to_string());
}

#[cfg(unix)]
#[test]
fn test_unreadable_agents_dir_is_io_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.agents_dir, "not a directory").unwrap();
    let notifier = RecordingNotifier::default();
    let controller = LifecycleController::new(&config, &notifier);

    assert!(matches!(controller.install(), Err(AgentError::Io(_))));
    assert!(matches!(controller.upgrade(), Err(AgentError::Io(_))));
    assert!(matches!(controller.uninstall(), Err(AgentError::Io(_))));
    assert!(matches!(controller.status(), Err(AgentError::Io(_))));
    assert!(notifier.calls().is_empty());
}

#[test]
fn test_status_serializes() {
    let status = AgentStatus {
        state: AgentState::Installed,
        descriptor: "/tmp/osx-sync-env.plist".to_string(),
    };
    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"state\":\"installed\""));
    assert!(json.contains("/tmp/osx-sync-env.plist"));
}

#[test]
fn test_agent_state_display() {
    assert_eq!(AgentState::Absent.to_string(), "absent");
    assert_eq!(AgentState::Installed.to_string(), "installed");
    assert_eq!(AgentState::Misconfigured.to_string(), "misconfigured");
}
