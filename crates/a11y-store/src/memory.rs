//! In-memory implementation of `AuditStore`.
//!
//! `InMemoryAuditStore` is the reference implementation of the `AuditStore`
//! trait. It keeps every record in a `HashMap` protected by a `Mutex`, making
//! it safe to share across concurrent requests. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use a11y_contracts::{
    error::{AuditError, AuditResult},
    record::{AuditId, AuditPatch, AuditRecord},
};
use a11y_core::traits::AuditStore;

// ── Public store ──────────────────────────────────────────────────────────────

/// A process-local audit store.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditStore {
    pub(crate) records: Arc<Mutex<HashMap<AuditId, AuditRecord>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AuditResult<MutexGuard<'_, HashMap<AuditId, AuditRecord>>> {
        self.records
            .lock()
            .map_err(|e| AuditError::persistence(format!("audit store lock poisoned: {}", e)))
    }
}

// ── AuditStore impl ───────────────────────────────────────────────────────────

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    /// Insert the record under its own id.
    ///
    /// Ids are unique by construction; a second create with the same id is
    /// rejected rather than silently overwriting history.
    async fn create(&self, record: &AuditRecord) -> AuditResult<AuditId> {
        let mut records = self.lock()?;
        if records.contains_key(&record.id) {
            return Err(AuditError::persistence(format!(
                "audit '{}' already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        debug!(audit_id = %record.id, status = %record.status(), "audit record stored");
        Ok(record.id)
    }

    async fn update(&self, id: &AuditId, patch: &AuditPatch) -> AuditResult<()> {
        let mut records = self.lock()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| AuditError::NotFound { id: id.to_string() })?;
        record.apply(patch)?;
        debug!(audit_id = %id, status = %record.status(), "audit record updated");
        Ok(())
    }

    async fn get(&self, id: &AuditId) -> AuditResult<Option<AuditRecord>> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> AuditResult<Vec<AuditRecord>> {
        let mut recent: Vec<AuditRecord> = self.lock()?.values().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}
