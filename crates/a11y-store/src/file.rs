//! File-backed implementation of `AuditStore`.
//!
//! One pretty-printed JSON document per record, named `<id>.json`, inside a
//! single directory. Writes go to a sibling temp file first and are renamed
//! into place, so a reader never observes a half-written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use a11y_contracts::{
    error::{AuditError, AuditResult},
    record::{AuditId, AuditPatch, AuditRecord},
};
use a11y_core::traits::AuditStore;

const EXTENSION: &str = "json";

/// A durable audit store rooted at a directory.
#[derive(Debug)]
pub struct FileAuditStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles on documents.
    write_lock: Mutex<()>,
}

impl FileAuditStore {
    /// Open (creating if needed) the store directory at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> AuditResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AuditError::persistence(format!(
                "failed to create store directory '{}': {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: &AuditId) -> PathBuf {
        self.root.join(format!("{}.{}", id, EXTENSION))
    }

    async fn read_document(path: &Path) -> AuditResult<AuditRecord> {
        let bytes = fs::read(path).await.map_err(|e| {
            AuditError::persistence(format!("failed to read '{}': {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| AuditError::InvalidDocument {
            reason: format!("'{}': {}", path.display(), e),
        })
    }

    async fn write_document(&self, record: &AuditRecord) -> AuditResult<()> {
        let path = self.document_path(&record.id);
        let tmp = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(record).map_err(|e| {
            AuditError::persistence(format!("failed to encode audit '{}': {}", record.id, e))
        })?;
        fs::write(&tmp, bytes).await.map_err(|e| {
            AuditError::persistence(format!("failed to write '{}': {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            AuditError::persistence(format!("failed to commit '{}': {}", path.display(), e))
        })
    }
}

#[async_trait]
impl AuditStore for FileAuditStore {
    async fn create(&self, record: &AuditRecord) -> AuditResult<AuditId> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(&record.id);
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AuditError::persistence(format!(
                "audit '{}' already exists",
                record.id
            )));
        }
        self.write_document(record).await?;

        debug!(audit_id = %record.id, path = %path.display(), "audit document created");
        Ok(record.id)
    }

    async fn update(&self, id: &AuditId, patch: &AuditPatch) -> AuditResult<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AuditError::NotFound { id: id.to_string() });
        }
        let mut record = Self::read_document(&path).await?;
        record.apply(patch)?;
        self.write_document(&record).await?;

        debug!(audit_id = %id, status = %record.status(), "audit document updated");
        Ok(())
    }

    async fn get(&self, id: &AuditId) -> AuditResult<Option<AuditRecord>> {
        let path = self.document_path(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        Self::read_document(&path).await.map(Some)
    }

    /// Scan the directory, skipping (and logging) documents that fail to parse.
    async fn list_recent(&self, limit: usize) -> AuditResult<Vec<AuditRecord>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            AuditError::persistence(format!("failed to list '{}': {}", self.root.display(), e))
        })?;

        let mut records = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(AuditError::persistence(format!("failed to list store: {}", e))),
            };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::read_document(&path).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable audit document"),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}
