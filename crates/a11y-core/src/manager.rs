//! The audit lifecycle manager: one audit request, end to end.
//!
//! The manager enforces the audit lifecycle:
//!
//!   Validate → Persist(pending) → Scan → Verify → Persist(completed | failed)
//!
//! Scan failures never escape: every audit that passes input validation
//! converges to a terminal, queryable record. The only errors returned to the
//! caller are `InvalidInput` (before any record exists) and store failures.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use a11y_contracts::{
    error::{AuditError, AuditResult},
    record::AuditRecord,
    report::{ScanFailure, ScanReport},
};

use crate::traits::{AuditStore, ReportVerifier, ScanEngine};

/// Message returned when the URL is missing or blank.
pub const URL_REQUIRED: &str = "URL is required";

/// Drives audits against an injected store, engine, and verifier.
///
/// Cheap to share: hold it in an `Arc` and call `run_audit` from as many
/// concurrent requests as needed. Requests share nothing but the store, so
/// two audits of the same URL produce two independent records.
pub struct AuditLifecycleManager {
    store: Arc<dyn AuditStore>,
    engine: Arc<dyn ScanEngine>,
    verifier: Arc<dyn ReportVerifier>,
}

impl AuditLifecycleManager {
    pub fn new(
        store: Arc<dyn AuditStore>,
        engine: Arc<dyn ScanEngine>,
        verifier: Arc<dyn ReportVerifier>,
    ) -> Self {
        Self { store, engine, verifier }
    }

    /// The store records are persisted to, for read-side queries.
    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Run one audit of `url`.
    ///
    /// # Pipeline
    ///
    /// 1. Reject a blank `url` with `AuditError::InvalidInput`; nothing is stored
    /// 2. Persist a `pending` record so even a crashed audit leaves a trace
    /// 3. Call `engine.scan()` once, with no timeout or retry of our own
    /// 4. Verify the raw report; a failing report counts as a scan failure
    /// 5. Transition to `completed` or `failed` and persist the patch
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank URL and `Persistence` (or whatever the store
    /// reports) when a store call fails. A failed scan is NOT an error: it is
    /// returned as `Ok` with a `failed` record.
    pub async fn run_audit(&self, url: &str) -> AuditResult<AuditRecord> {
        if url.trim().is_empty() {
            return Err(AuditError::InvalidInput {
                reason: URL_REQUIRED.to_string(),
            });
        }

        let mut record = AuditRecord::pending(url);
        record.id = self.store.create(&record).await?;

        debug!(audit_id = %record.id, url = %record.url, "audit record created, starting scan");

        let outcome = self.engine.scan(url).await.and_then(|raw| self.accept(raw));

        let patch = match outcome {
            Ok(report) => {
                info!(
                    audit_id = %record.id,
                    url = %record.url,
                    violations = report.violations().len(),
                    passes = report.passes().len(),
                    incomplete = report.incomplete().len(),
                    "audit completed"
                );
                record.complete(report)?
            }
            Err(failure) => {
                let failure = ScanFailure::new(failure.message);
                warn!(
                    audit_id = %record.id,
                    url = %record.url,
                    error = %failure,
                    "audit failed"
                );
                record.fail(failure)?
            }
        };

        self.store.update(&record.id, &patch).await?;
        Ok(record)
    }

    /// Verify and decode a raw engine report.
    fn accept(&self, raw: Value) -> Result<ScanReport, ScanFailure> {
        let verification = self.verifier.verify(&raw);
        if !verification.passed {
            return Err(ScanFailure::new(format!(
                "scan report failed verification: {}",
                verification.failure_summary()
            )));
        }

        ScanReport::from_value(raw).map_err(|e| {
            ScanFailure::new(format!("scan report failed verification: {}", e))
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
