//! Server configuration.
//!
//! `ServerConfig` is deserialized from TOML. Every section and field has a
//! default, so an empty document (or no file at all) yields a working
//! development server: in-memory store, port 5000, scanner `a11y-scan` on
//! `PATH`.
//!
//! Example:
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! static_dir = "client/build"
//!
//! [store]
//! kind = "file"
//! path = "data/audits"
//!
//! [scanner]
//! program = "/usr/local/bin/a11y-scan"
//! args = ["--wait-until", "networkidle0"]
//! timeout_secs = 60
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use a11y_contracts::error::{AuditError, AuditResult};

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub store: StoreConfig,
    pub scanner: ScannerConfig,
}

/// Where the HTTP boundary listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Built client assets. When set, unmatched GETs are served from here,
    /// falling back to `index.html`.
    pub static_dir: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
        }
    }
}

/// Which audit store backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Directory for `kind = "file"`. Required for that kind.
    pub path: Option<PathBuf>,
}

/// The external scanner process.
///
/// `program` is not bundled: it must exist on `PATH` (default `a11y-scan`) or
/// be given as a path. The stdin/stdout protocol and a sample wrapper are
/// documented in `a11y_scan::process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Upper bound for one scan. Absent means the scanner's own policy rules.
    pub timeout_secs: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("a11y-scan"),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl ScannerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ServerConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AuditError::Config` if the TOML is malformed, does not match
    /// the expected schema, or fails validation.
    pub fn from_toml_str(s: &str) -> AuditResult<Self> {
        let config: ServerConfig = toml::from_str(s).map_err(|e| AuditError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> AuditResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> AuditResult<()> {
        if self.store.kind == StoreKind::File && self.store.path.is_none() {
            return Err(AuditError::Config {
                reason: "store.path is required when store.kind = \"file\"".to_string(),
            });
        }
        if self.scanner.program.as_os_str().is_empty() {
            return Err(AuditError::Config {
                reason: "scanner.program must not be empty".to_string(),
            });
        }
        if self.scanner.timeout_secs == Some(0) {
            return Err(AuditError::Config {
                reason: "scanner.timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the address to bind. `host` may be an IP literal (IPv6 with
    /// or without brackets) or a hostname such as `localhost`.
    pub async fn socket_addr(&self) -> AuditResult<SocketAddr> {
        let host = self.server.host.trim_start_matches('[').trim_end_matches(']');
        let port = self.server.port;
        let invalid = |detail: String| AuditError::Config {
            reason: format!("invalid listen address '{}' port {}: {}", host, port, detail),
        };

        tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }
}
