//! The in-memory history list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use a11y_contracts::record::AuditRecord;

/// Maximum number of entries kept.
pub const MAX_ENTRIES: usize = 10;

/// One remembered audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    /// Number of violations the audit found.
    pub violations: usize,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// An entry for a completed record, stamped with the current time.
    ///
    /// Returns `None` for records that are not `completed`: only successful
    /// audits are remembered.
    pub fn from_record(record: &AuditRecord) -> Option<Self> {
        record.report().map(|report| Self {
            url: record.url.clone(),
            violations: report.violations().len(),
            timestamp: Utc::now(),
        })
    }
}

/// Recent audits, most recent first, never more than [`MAX_ENTRIES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditHistory {
    entries: Vec<HistoryEntry>,
}

impl AuditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, enforcing the cap.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Put `entry` first, dropping the oldest entry past the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
