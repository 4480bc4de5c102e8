//! File-backed storage for the history list.
//!
//! The slot holds a single JSON array. It is read once at client startup and
//! rewritten after each successful audit. Unreadable or malformed contents
//! are logged and treated as an empty history; the next save replaces them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use a11y_contracts::error::{AuditError, AuditResult};

use crate::cache::{AuditHistory, HistoryEntry};

/// The client-local key-value slot holding the history.
#[derive(Debug, Clone)]
pub struct HistorySlot {
    path: PathBuf,
}

impl HistorySlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored history. Never fails: a missing, unreadable, or
    /// malformed slot yields an empty history.
    pub fn load(&self) -> AuditHistory {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AuditHistory::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read history, starting empty");
                return AuditHistory::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&contents) {
            Ok(entries) => AuditHistory::from_entries(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse history, resetting");
                AuditHistory::new()
            }
        }
    }

    /// Replace the stored history.
    pub fn save(&self, history: &AuditHistory) -> AuditResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AuditError::persistence(format!(
                    "failed to create history directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(history).map_err(|e| {
            AuditError::persistence(format!("failed to encode history: {}", e))
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| {
            AuditError::persistence(format!("failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AuditError::persistence(format!("failed to commit '{}': {}", self.path.display(), e))
        })
    }
}
