//! # a11y-history
//!
//! The client-side audit history: the ten most recent successful audits,
//! newest first, kept in one local JSON slot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use a11y_history::{HistoryEntry, HistorySlot};
//!
//! let slot = HistorySlot::new(".a11y-history.json");
//! let mut history = slot.load();
//! if let Some(entry) = HistoryEntry::from_record(&record) {
//!     history.record(entry);
//!     slot.save(&history)?;
//! }
//! ```

pub mod cache;
pub mod slot;

pub use cache::{AuditHistory, HistoryEntry, MAX_ENTRIES};
pub use slot::HistorySlot;

// ── Tests ─────────────────────────────────────────────────────────────────────
