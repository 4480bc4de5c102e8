//! # a11y-store
//!
//! Audit record storage for the accessibility auditor.
//!
//! ## Overview
//!
//! Two implementations of [`AuditStore`](a11y_core::traits::AuditStore):
//!
//! - [`InMemoryAuditStore`] — a `Mutex`-guarded map; the reference store and
//!   the default for development.
//! - [`FileAuditStore`] — one JSON document per audit in a directory,
//!   committed by atomic rename.
//!
//! Both enforce the forward-only status rule on every update by applying the
//! patch through [`AuditRecord::apply`](a11y_contracts::record::AuditRecord::apply).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use a11y_store::FileAuditStore;
//!
//! let store = FileAuditStore::open("data/audits").await?;
//! let id = store.create(&AuditRecord::pending("https://example.com")).await?;
//! ```

pub mod file;
pub mod memory;

pub use file::FileAuditStore;
pub use memory::InMemoryAuditStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
