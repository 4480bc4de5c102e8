//! External scanner processes as browsing sessions.
//!
//! `ProcessLauncher` starts one scanner process per scan: typically a small
//! wrapper that drives a headless browser and runs the rule engine in the
//! loaded page. The protocol is line-oriented and minimal:
//!
//! 1. the URL is written to the child's stdin, followed by a newline
//! 2. on success the child prints the raw report JSON to stdout and exits 0
//! 3. on failure it prints a human-readable message to stderr and exits
//!    non-zero; that message becomes the audit's error verbatim
//!
//! The report must be a JSON object with `violations`, `passes` and
//! `incomplete` arrays (optionally `inapplicable`), each holding rule results
//! shaped like `{id, impact, help, description, helpUrl, nodes: [{html, ...}]}`.
//! This is the result object of axe-core's `axe.run()`, so any wrapper that
//! prints it unchanged works. Extra fields are stored as received.
//!
//! No scanner ships with the server. The default program name is `a11y-scan`
//! on `PATH`; point `[scanner] program` at your own wrapper otherwise. A
//! minimal wrapper using Node, Puppeteer and `@axe-core/puppeteer`:
//!
//! ```text
//! #!/usr/bin/env node
//! // a11y-scan: URL on stdin, axe report on stdout, error on stderr.
//! import puppeteer from "puppeteer";
//! import { AxePuppeteer } from "@axe-core/puppeteer";
//!
//! let input = "";
//! for await (const chunk of process.stdin) input += chunk;
//! const url = input.trim();
//!
//! const browser = await puppeteer.launch({ headless: "new" });
//! try {
//!   const page = await browser.newPage();
//!   await page.goto(url, { waitUntil: "networkidle0" });
//!   const report = await new AxePuppeteer(page).analyze();
//!   process.stdout.write(JSON.stringify(report));
//! } catch (err) {
//!   process.stderr.write(String(err?.message ?? err));
//!   process.exitCode = 1;
//! } finally {
//!   await browser.close();
//! }
//! ```
//!
//! and the matching server config:
//!
//! ```toml
//! [scanner]
//! program = "/usr/local/bin/a11y-scan"
//! timeout_secs = 60
//! ```
//!
//! The protocol can be checked by hand:
//! `echo https://example.com | a11y-scan | head -c 200`.
//!
//! Children are spawned with `kill_on_drop`, so a dropped request future
//! still reaps its process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::debug;

use a11y_contracts::report::ScanFailure;

use crate::session::{BrowserLauncher, BrowserSession};

/// Launches scanner processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Arguments passed to every spawned scanner.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Bound each scan. Without one a hung scanner hangs its audit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

#[async_trait]
impl BrowserLauncher for ProcessLauncher {
    type Session = ProcessSession;

    async fn launch(&self) -> Result<ProcessSession, ScanFailure> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ScanFailure::new(format!(
                    "failed to launch scanner '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        debug!(program = %self.program.display(), pid = ?child.id(), "scanner process spawned");

        Ok(ProcessSession {
            child: Some(child),
            timeout: self.timeout,
        })
    }
}

/// One running scanner process.
#[derive(Debug)]
pub struct ProcessSession {
    child: Option<Child>,
    timeout: Option<Duration>,
}

impl ProcessSession {
    async fn drive(child: &mut Child, url: &str) -> Result<Value, ScanFailure> {
        if let Some(mut stdin) = child.stdin.take() {
            // A scanner may exit before reading; its exit status tells the story.
            if let Err(e) = stdin.write_all(format!("{}\n", url).as_bytes()).await {
                debug!(error = %e, "scanner did not accept the url on stdin");
            }
        }

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let (out_read, err_read) = match (child.stdout.as_mut(), child.stderr.as_mut()) {
            (Some(out), Some(err)) => {
                tokio::join!(out.read_to_end(&mut stdout), err.read_to_end(&mut stderr))
            }
            _ => return Err(ScanFailure::new("scanner output streams are unavailable")),
        };
        out_read
            .and(err_read)
            .map_err(|e| ScanFailure::new(format!("failed to read scanner output: {}", e)))?;

        let status = child
            .wait()
            .await
            .map_err(|e| ScanFailure::new(format!("failed to wait for scanner: {}", e)))?;

        if !status.success() {
            let message = String::from_utf8_lossy(&stderr).trim().to_string();
            return Err(if message.is_empty() {
                ScanFailure::new(format!("scanner exited with {}", status))
            } else {
                ScanFailure::new(message)
            });
        }

        serde_json::from_slice(&stdout)
            .map_err(|e| ScanFailure::new(format!("scanner produced invalid JSON: {}", e)))
    }
}

#[async_trait]
impl BrowserSession for ProcessSession {
    async fn audit(&mut self, url: &str) -> Result<Value, ScanFailure> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| ScanFailure::new("browsing session already closed"))?;

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, Self::drive(child, url))
                .await
                .map_err(|_| {
                    ScanFailure::new(format!("scan timed out after {} ms", limit.as_millis()))
                })?,
            None => Self::drive(child, url).await,
        }
    }

    /// Kill the process if it is still running. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), ScanFailure> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(_)) => Ok(()),
            _ => child
                .kill()
                .await
                .map_err(|e| ScanFailure::new(format!("failed to stop scanner: {}", e))),
        }
    }
}
