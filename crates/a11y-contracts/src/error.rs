//! Error types for the audit pipeline.
//!
//! All fallible operations in the auditor return `AuditResult<T>`. Scan
//! failures are deliberately absent here: they are captured into a `failed`
//! record as a [`ScanFailure`](crate::report::ScanFailure) and never
//! propagated to the caller.

use thiserror::Error;

use crate::record::AuditStatus;

/// The unified error type for the auditor crates.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The request was rejected before any record was created.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The audit store could not create, update, or read a record.
    ///
    /// Fatal to the request in flight, never to the process.
    #[error("persistence failed: {reason}")]
    Persistence { reason: String },

    /// A status change would move a record backwards or out of a terminal state.
    #[error("illegal status transition from '{from}' to '{to}'")]
    InvalidTransition { from: AuditStatus, to: AuditStatus },

    /// No record exists under the requested id.
    #[error("audit '{id}' not found")]
    NotFound { id: String },

    /// A stored or received audit document breaks the record invariants.
    #[error("invalid audit document: {reason}")]
    InvalidDocument { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl AuditError {
    /// Shorthand for a [`AuditError::Persistence`] carrying `reason`.
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the auditor crates.
pub type AuditResult<T> = Result<T, AuditError>;
