//! LaunchAgent descriptor: plist generation, create/delete/detect.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use syncenv_config::{AGENT_LABEL, SyncEnvConfig};

use crate::error::AgentError;

/// The single per-user plist that registers `sync` as a login agent.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    path: PathBuf,
}

impl AgentDescriptor {
    /// Create a descriptor manager for an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a descriptor manager at the configured location.
    pub fn from_config(config: &SyncEnvConfig) -> Self {
        Self::new(config.descriptor_path())
    }

    /// Get the plist file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether anything exists at the descriptor path.
    ///
    /// A missing entry is `Ok(false)`; any other stat failure is an error.
    pub fn exists(&self) -> Result<bool, AgentError> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AgentError::Io(e)),
        }
    }

    /// Whether the existing entry at the descriptor path is a directory.
    pub fn is_directory(&self) -> Result<bool, AgentError> {
        Ok(fs::metadata(&self.path)?.is_dir())
    }

    /// Generate the plist XML content.
    pub fn render(shell_path: &str, program_path: &Path) -> String {
        let program = program_path.to_string_lossy();
        let arguments = [&*program, "-c", "-l", shell_path, "sync"];

        let mut plist = String::new();
        plist.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        plist.push_str("<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n");
        plist.push_str("<plist version=\"1.0\">\n");
        plist.push_str("<dict>\n");

        plist.push_str("    <key>Label</key>\n");
        plist.push_str(&format!("    <string>{}</string>\n", AGENT_LABEL));

        plist.push_str("    <key>ProgramArguments</key>\n");
        plist.push_str("    <array>\n");
        for arg in arguments {
            plist.push_str(&format!("        <string>{}</string>\n", escape_xml(arg)));
        }
        plist.push_str("    </array>\n");

        plist.push_str("    <key>RunAtLoad</key>\n");
        plist.push_str("    <true/>\n");

        plist.push_str("</dict>\n");
        plist.push_str("</plist>\n");

        plist
    }

    /// Write the descriptor, replacing any file already at the path.
    ///
    /// Callers check [`exists`](Self::exists) first; this does not.
    pub fn create(&self, shell_path: &str, program_path: &Path) -> Result<(), AgentError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = Self::render(shell_path, program_path);
        let mut file = fs::File::create(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        tracing::info!("Created LaunchAgent plist at: {}", self.path.display());
        Ok(())
    }

    /// Remove the descriptor. Fails if it is missing.
    pub fn delete(&self) -> Result<(), AgentError> {
        fs::remove_file(&self.path)?;
        tracing::info!("Removed LaunchAgent plist: {}", self.path.display());
        Ok(())
    }
}

/// Escape special characters for XML.
pub(super) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
