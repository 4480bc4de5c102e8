//! The audit record and its status lifecycle.
//!
//! `AuditRecord` is the only persisted entity. Status and results travel
//! together as one [`AuditOutcome`], so consumers pattern-match on the
//! outcome instead of probing an optional results field:
//!
//! ```text
//!   Pending ──► Processing ──► Completed(report)
//!      │             │
//!      └─────────────┴───────► Failed(error)
//! ```
//!
//! Transitions only move forward and terminal states never change. On the
//! wire a record is an [`AuditDocument`]: flat `status` and `results` keys
//! with camelCase timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AuditError, AuditResult},
    report::{ScanFailure, ScanReport},
};

/// Opaque, immutable identifier assigned when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(pub uuid::Uuid);

impl AuditId {
    /// Create a new, unique audit ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse the textual form produced by `Display`.
    pub fn parse(s: &str) -> AuditResult<Self> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| AuditError::InvalidInput {
                reason: format!("'{}' is not a valid audit id: {}", s, e),
            })
    }
}

impl Default for AuditId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a record is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AuditStatus {
    fn rank(self) -> u8 {
        match self {
            AuditStatus::Pending => 0,
            AuditStatus::Processing => 1,
            AuditStatus::Completed | AuditStatus::Failed => 2,
        }
    }

    /// `Completed` and `Failed` are terminal.
    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// True when moving from `self` to `next` is a forward step.
    pub fn can_transition_to(self, next: AuditStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Pending => "pending",
            AuditStatus::Processing => "processing",
            AuditStatus::Completed => "completed",
            AuditStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and results as one value.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    /// Persisted, scan not yet attempted.
    Pending,
    /// Scan in progress.
    Processing,
    /// The scan produced a verified report.
    Completed(ScanReport),
    /// The scan failed; never carries a partial report.
    Failed(ScanFailure),
}

impl AuditOutcome {
    pub fn status(&self) -> AuditStatus {
        match self {
            AuditOutcome::Pending => AuditStatus::Pending,
            AuditOutcome::Processing => AuditStatus::Processing,
            AuditOutcome::Completed(_) => AuditStatus::Completed,
            AuditOutcome::Failed(_) => AuditStatus::Failed,
        }
    }
}

/// The mutation applied to a stored record after a scan attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditPatch {
    pub outcome: AuditOutcome,
    pub updated_at: DateTime<Utc>,
}

/// One audit: a URL, its outcome, and when it was created and last changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "AuditDocument", try_from = "AuditDocument")]
pub struct AuditRecord {
    pub id: AuditId,
    pub url: String,
    outcome: AuditOutcome,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditRecord {
    /// A fresh `pending` record for `url`, stored exactly as given.
    pub fn pending(url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AuditId::new(),
            url: url.into(),
            outcome: AuditOutcome::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> AuditStatus {
        self.outcome.status()
    }

    pub fn outcome(&self) -> &AuditOutcome {
        &self.outcome
    }

    /// The report, when the record is `completed`.
    pub fn report(&self) -> Option<&ScanReport> {
        match &self.outcome {
            AuditOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// The failure, when the record is `failed`.
    pub fn failure(&self) -> Option<&ScanFailure> {
        match &self.outcome {
            AuditOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Move to `next`, refreshing `updated_at`, and return the patch a store
    /// needs to persist the change.
    pub fn transition(&mut self, next: AuditOutcome) -> AuditResult<AuditPatch> {
        let patch = AuditPatch {
            outcome: next,
            updated_at: Utc::now().max(self.updated_at),
        };
        self.apply(&patch)?;
        Ok(patch)
    }

    pub fn complete(&mut self, report: ScanReport) -> AuditResult<AuditPatch> {
        self.transition(AuditOutcome::Completed(report))
    }

    pub fn fail(&mut self, failure: ScanFailure) -> AuditResult<AuditPatch> {
        self.transition(AuditOutcome::Failed(failure))
    }

    /// Apply a patch produced elsewhere, rejecting backward transitions.
    ///
    /// Stores call this so that the forward-only rule holds for every
    /// persisted mutation, not only for in-process ones.
    pub fn apply(&mut self, patch: &AuditPatch) -> AuditResult<()> {
        let from = self.status();
        let to = patch.outcome.status();
        if !from.can_transition_to(to) {
            return Err(AuditError::InvalidTransition { from, to });
        }
        self.outcome = patch.outcome.clone();
        self.updated_at = patch.updated_at;
        Ok(())
    }
}

/// The wire and storage shape of an [`AuditRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDocument {
    pub id: AuditId,
    pub url: String,
    pub status: AuditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuditRecord> for AuditDocument {
    fn from(record: AuditRecord) -> Self {
        let status = record.status();
        let results = match record.outcome {
            AuditOutcome::Pending | AuditOutcome::Processing => None,
            AuditOutcome::Completed(report) => Some(report.into_value()),
            AuditOutcome::Failed(failure) => Some(
                serde_json::to_value(failure).expect("ScanFailure is always representable as JSON"),
            ),
        };

        Self {
            id: record.id,
            url: record.url,
            status,
            results,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<AuditDocument> for AuditRecord {
    type Error = AuditError;

    fn try_from(doc: AuditDocument) -> AuditResult<Self> {
        let invalid = |reason: String| AuditError::InvalidDocument { reason };

        let outcome = match (doc.status, doc.results) {
            (AuditStatus::Pending, None) => AuditOutcome::Pending,
            (AuditStatus::Processing, None) => AuditOutcome::Processing,
            (status @ (AuditStatus::Pending | AuditStatus::Processing), Some(_)) => {
                return Err(invalid(format!("{} record must not carry results", status)));
            }
            (status, None) | (status, Some(Value::Null)) => {
                return Err(invalid(format!("{} record is missing results", status)));
            }
            (AuditStatus::Completed, Some(results)) => {
                let report = ScanReport::from_value(results)
                    .map_err(|e| invalid(format!("completed results are not a scan report: {}", e)))?;
                AuditOutcome::Completed(report)
            }
            (AuditStatus::Failed, Some(results)) => {
                let failure: ScanFailure = serde_json::from_value(results)
                    .map_err(|e| invalid(format!("failed results carry no error: {}", e)))?;
                if failure.message.trim().is_empty() {
                    return Err(invalid("failed results carry an empty error".to_string()));
                }
                AuditOutcome::Failed(failure)
            }
        };

        Ok(Self {
            id: doc.id,
            url: doc.url,
            outcome,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}
