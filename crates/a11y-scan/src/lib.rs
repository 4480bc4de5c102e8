//! # a11y-scan
//!
//! Scan engines for the accessibility auditor.
//!
//! The rule engine itself is external. This crate owns the part that is
//! easy to get wrong around it: every scan acquires an isolated browsing
//! session and releases it on every path.
//!
//! - [`session::SessionScanEngine`] — generic `ScanEngine` over a
//!   [`session::BrowserLauncher`], guaranteeing one `close()` per launch.
//! - [`process::ProcessLauncher`] — sessions backed by an external scanner
//!   process that speaks a stdin/stdout JSON protocol.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use a11y_scan::{ProcessLauncher, SessionScanEngine};
//!
//! let engine = SessionScanEngine::new(
//!     ProcessLauncher::new("a11y-scan").with_timeout(Some(Duration::from_secs(60))),
//! );
//! let raw = engine.scan("https://example.com").await?;
//! ```

pub mod process;
pub mod session;

pub use process::{ProcessLauncher, ProcessSession};
pub use session::{BrowserLauncher, BrowserSession, SessionScanEngine};
