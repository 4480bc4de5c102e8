//! Collaborator traits for the audit pipeline.
//!
//! These three traits are everything the lifecycle manager knows about the
//! outside world:
//!
//! - `ScanEngine`     — untrusted, slow, fallible page scanner
//! - `ReportVerifier` — trusted shape check on the scanner's raw output
//! - `AuditStore`     — durable document storage for audit records
//!
//! Implementations are injected at construction; the manager owns no global
//! state.

use async_trait::async_trait;
use serde_json::Value;

use a11y_contracts::{
    error::AuditResult,
    record::{AuditId, AuditPatch, AuditRecord},
    report::ScanFailure,
    verify::VerificationReport,
};

/// Loads a page in an isolated browsing context and runs the rule engine.
///
/// Implementations own their resource discipline: whatever context they
/// acquire must be released on both the success and the failure path. They
/// also own any timeout policy; the manager adds none.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Scan `url` and return the engine's raw report.
    ///
    /// Any failure (navigation, network, rule evaluation) is returned as a
    /// `ScanFailure` whose message is recorded verbatim.
    async fn scan(&self, url: &str) -> Result<Value, ScanFailure>;
}

/// Checks a raw report before it may complete an audit.
///
/// Verification is synchronous and cheap; it never performs I/O.
pub trait ReportVerifier: Send + Sync {
    fn verify(&self, report: &Value) -> VerificationReport;
}

/// Durable storage for audit records, keyed by `AuditId`.
///
/// Both `create` and `update` are durable once they return `Ok`.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a new record and return the id it is stored under.
    async fn create(&self, record: &AuditRecord) -> AuditResult<AuditId>;

    /// Apply `patch` to the stored record `id`.
    ///
    /// Returns `AuditError::NotFound` for unknown ids and
    /// `AuditError::InvalidTransition` when the patch would move the stored
    /// record backwards.
    async fn update(&self, id: &AuditId, patch: &AuditPatch) -> AuditResult<()>;

    /// Fetch a record by id.
    async fn get(&self, id: &AuditId) -> AuditResult<Option<AuditRecord>>;

    /// Up to `limit` records, newest first.
    async fn list_recent(&self, limit: usize) -> AuditResult<Vec<AuditRecord>>;
}
