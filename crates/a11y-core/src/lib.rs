//! # a11y-core
//!
//! The audit lifecycle for the accessibility auditor.
//!
//! This crate provides:
//! - The three collaborator traits (`ScanEngine`, `ReportVerifier`, `AuditStore`)
//! - The `AuditLifecycleManager` that drives one audit from request to
//!   terminal record
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a11y_core::AuditLifecycleManager;
//!
//! let manager = AuditLifecycleManager::new(store, engine, verifier);
//! let record = manager.run_audit("https://example.com").await?;
//! ```

pub mod manager;
pub mod traits;

pub use manager::{AuditLifecycleManager, URL_REQUIRED};
pub use traits::{AuditStore, ReportVerifier, ScanEngine};
