//! Session-scoped scanning.
//!
//! Every scan runs inside one isolated browsing session. `SessionScanEngine`
//! is the only place sessions are acquired, and it releases each one exactly
//! once after the audit returns, whatever the audit returned:
//!
//!   launch → audit → close
//!
//! A close error is logged and never replaces the audit's own outcome.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use a11y_contracts::report::ScanFailure;
use a11y_core::traits::ScanEngine;

/// Acquires isolated browsing sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// Start a fresh session. No session exists if this fails.
    async fn launch(&self) -> Result<Self::Session, ScanFailure>;
}

/// One isolated browsing context.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, run the rule engine, and return its raw report.
    async fn audit(&mut self, url: &str) -> Result<Value, ScanFailure>;

    /// Release the session. Called exactly once per launched session.
    async fn close(&mut self) -> Result<(), ScanFailure>;
}

/// A `ScanEngine` that runs each scan in its own launched session.
#[derive(Debug)]
pub struct SessionScanEngine<L> {
    launcher: L,
}

impl<L: BrowserLauncher> SessionScanEngine<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }
}

#[async_trait]
impl<L: BrowserLauncher> ScanEngine for SessionScanEngine<L> {
    async fn scan(&self, url: &str) -> Result<Value, ScanFailure> {
        let mut session = self.launcher.launch().await?;
        debug!(url = %url, "browsing session launched");

        let outcome = session.audit(url).await;

        if let Err(e) = session.close().await {
            warn!(url = %url, error = %e, "failed to close browsing session");
        }
        debug!(url = %url, ok = outcome.is_ok(), "browsing session closed");

        outcome
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
