//! a11y: accessibility auditor CLI
//!
//! Starts the audit server, submits audits to a running server, and keeps a
//! short local history of successful audits.
//!
//! Usage:
//!   a11y serve --config a11y.toml
//!   a11y audit https://example.com --out report.json
//!   a11y history
//!   a11y history --clear

mod client;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use a11y_history::{HistoryEntry, HistorySlot};
use a11y_server::ServerConfig;

use client::{AuditClient, ClientError};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Web accessibility auditor.
#[derive(Parser, Debug)]
#[command(
    name = "a11y",
    about = "Run and review web accessibility audits",
    long_about = "Runs the audit server, submits URLs to it, and remembers the\n\
                  ten most recent successful audits."
)]
struct Cli {
    /// Local file holding the audit history.
    #[arg(
        long,
        global = true,
        env = "A11Y_HISTORY",
        default_value = ".a11y-history.json"
    )]
    history_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// TOML configuration file.
        #[arg(long, env = "A11Y_CONFIG")]
        config: Option<PathBuf>,
        /// Listen host, overriding the config file.
        #[arg(long, env = "A11Y_HOST")]
        host: Option<String>,
        /// Listen port, overriding the config file.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Audit a URL through a running server.
    Audit {
        url: String,
        /// Base URL of the auditor server.
        #[arg(long, env = "A11Y_SERVER", default_value = "http://localhost:5000")]
        server: String,
        /// Also write the full record as JSON to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or clear the local audit history.
    History {
        #[arg(long)]
        clear: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let slot = HistorySlot::new(cli.history_file);

    let result = match cli.command {
        Command::Serve { config, host, port } => run_serve(config, host, port).await,
        Command::Audit { url, server, out } => run_audit(&slot, &url, &server, out).await,
        Command::History { clear } => run_history(&slot, clear),
    };

    match result {
        Ok(()) => {}
        Err(ClientError::Rejected { message, error, .. }) => {
            eprintln!("{}", render::render_rejection(&message, error.as_deref()));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run_serve(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), ClientError> {
    let mut config = match config {
        Some(path) => ServerConfig::from_file(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    a11y_server::serve(config).await?;
    Ok(())
}

async fn run_audit(
    slot: &HistorySlot,
    url: &str,
    server: &str,
    out: Option<PathBuf>,
) -> Result<(), ClientError> {
    let mut history = slot.load();
    let record = AuditClient::new(server).run_audit(url).await?;

    print!("{}", render::render_summary(&record));

    if let Some(entry) = HistoryEntry::from_record(&record) {
        history.record(entry);
        if let Err(e) = slot.save(&history) {
            warn!(path = %slot.path().display(), error = %e, "failed to save history");
        }
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&record).map_err(|e| {
            ClientError::UnexpectedResponse {
                status: 200,
                reason: format!("record could not be re-encoded: {}", e),
            }
        })?;
        std::fs::write(&path, json).map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn run_history(slot: &HistorySlot, clear: bool) -> Result<(), ClientError> {
    let mut history = slot.load();
    if clear {
        history.clear();
        slot.save(&history)?;
        println!("History cleared.");
        return Ok(());
    }

    print!("{}", render::render_history(&history));
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn audit_defaults_to_local_server() {
        let cli = Cli::try_parse_from(["a11y", "audit", "https://example.com"]).unwrap();
        match cli.command {
            Command::Audit { url, server, out } => {
                assert_eq!(url, "https://example.com");
                assert!(server.starts_with("http://"));
                assert!(out.is_none());
            }
            other => panic!("expected audit, got {other:?}"),
        }
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "a11y",
            "serve",
            "--config",
            "a11y.toml",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
        ])
        .unwrap();
        match cli.command {
            Command::Serve { config, host, port } => {
                assert_eq!(config, Some(PathBuf::from("a11y.toml")));
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(8080));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn audit_requires_url() {
        assert!(Cli::try_parse_from(["a11y", "audit"]).is_err());
    }

    #[test]
    fn history_clear_empties_slot() {
        let dir = std::env::temp_dir().join(format!(
            "a11y-cli-history-{}",
            a11y_contracts::record::AuditId::new()
        ));
        let slot = HistorySlot::new(dir.join("history.json"));
        let mut history = slot.load();
        history.record(HistoryEntry {
            url: "https://example.com".to_string(),
            violations: 4,
            timestamp: chrono::Utc::now(),
        });
        slot.save(&history).unwrap();
        assert_eq!(slot.load().len(), 1);

        run_history(&slot, true).unwrap();
        assert!(slot.load().is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }
}
