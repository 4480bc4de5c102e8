//! Report verification results.
//!
//! Before a raw engine payload may complete an audit, a verifier checks its
//! shape. Only a passing `VerificationReport` lets the record reach
//! `completed`.

use serde::{Deserialize, Serialize};

/// The result of checking one raw report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    /// All failures collected during this run. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    pub fn pass() -> Self {
        Self {
            passed: true,
            failures: Vec::new(),
        }
    }

    pub fn from_failures(failures: Vec<VerificationFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }

    /// All failures joined as `[check] message; ...`.
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.check_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single failed check within a `VerificationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Which check failed, e.g. `"json-schema"`.
    pub check_id: String,
    /// Human-readable explanation.
    pub message: String,
}
