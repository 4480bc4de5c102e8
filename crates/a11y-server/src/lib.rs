//! # a11y-server
//!
//! The HTTP boundary of the auditor. Wires a configured store, scanner and
//! report verifier into an `AuditLifecycleManager` and exposes it as a small
//! JSON API:
//!
//! | Route                  | Purpose                                   |
//! |------------------------|-------------------------------------------|
//! | `GET /`                | liveness message                          |
//! | `POST /api/audit`      | run one audit, answer with its record     |
//! | `GET /api/audit`       | recent records, newest first (`?limit=N`) |
//! | `GET /api/audit/{id}`  | one stored record                         |
//!
//! When `server.static_dir` is configured, any other GET is served from that
//! directory with `index.html` as the SPA fallback.

pub mod config;
pub mod errors;
pub mod handlers;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

use a11y_contracts::error::{AuditError, AuditResult};
use a11y_core::{
    manager::AuditLifecycleManager,
    traits::{AuditStore, ReportVerifier, ScanEngine},
};
use a11y_scan::{ProcessLauncher, SessionScanEngine};
use a11y_store::{FileAuditStore, InMemoryAuditStore};
use a11y_verify::ReportSchemaVerifier;

pub use config::{HttpConfig, ScannerConfig, ServerConfig, StoreConfig, StoreKind};
pub use errors::{ApiError, ApiResult, AUDIT_FAILED};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<AuditLifecycleManager>,
}

impl AppState {
    pub fn new(manager: AuditLifecycleManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Build the store, scanner and verifier named by `config`.
pub async fn build_state(config: &ServerConfig) -> AuditResult<AppState> {
    let store: Arc<dyn AuditStore> = match config.store.kind {
        StoreKind::Memory => Arc::new(InMemoryAuditStore::new()),
        StoreKind::File => {
            let path = config.store.path.clone().ok_or_else(|| AuditError::Config {
                reason: "store.path is required when store.kind = \"file\"".to_string(),
            })?;
            Arc::new(FileAuditStore::open(path).await?)
        }
    };

    let launcher = ProcessLauncher::new(config.scanner.program.clone())
        .with_args(config.scanner.args.iter().cloned())
        .with_timeout(config.scanner.timeout());
    let engine: Arc<dyn ScanEngine> = Arc::new(SessionScanEngine::new(launcher));
    let verifier: Arc<dyn ReportVerifier> = Arc::new(ReportSchemaVerifier::new());

    info!(
        store = ?config.store.kind,
        scanner = %config.scanner.program.display(),
        "audit pipeline ready"
    );

    Ok(AppState::new(AuditLifecycleManager::new(store, engine, verifier)))
}

/// Assemble the router.
pub fn create_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/", get(handlers::root))
        .route(
            "/api/audit",
            post(handlers::start_audit).get(handlers::list_audits),
        )
        .route("/api/audit/", post(handlers::start_audit))
        .route("/api/audit/{id}", get(handlers::get_audit))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> AuditResult<()> {
    let addr = config.socket_addr().await?;
    let state = build_state(&config).await?;
    let app = create_app(state, config.server.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AuditError::Config {
            reason: format!("failed to bind {}: {}", addr, e),
        })?;
    info!(%addr, "a11y-auditor listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AuditError::Config {
            reason: format!("server error: {}", e),
        })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use a11y_contracts::{
        record::{AuditRecord, AuditStatus},
        report::ScanFailure,
    };
    use a11y_core::{
        manager::AuditLifecycleManager,
        traits::{AuditStore, ScanEngine},
    };
    use a11y_store::InMemoryAuditStore;
    use a11y_verify::ReportSchemaVerifier;

    use super::{create_app, AppState, ServerConfig, StoreKind};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Fails URLs containing "bad", garbles URLs containing "garbled", and
    /// returns a fixed report otherwise.
    struct FixedEngine;

    #[async_trait]
    impl ScanEngine for FixedEngine {
        async fn scan(&self, url: &str) -> Result<Value, ScanFailure> {
            if url.contains("bad") {
                return Err(ScanFailure::new("net::ERR_NAME_NOT_RESOLVED"));
            }
            if url.contains("garbled") {
                return Ok(json!({ "violations": "nope" }));
            }
            Ok(engine_report())
        }
    }

    fn engine_report() -> Value {
        json!({
            "violations": [{
                "id": "image-alt",
                "impact": "critical",
                "help": "Images must have alternate text",
                "nodes": [{ "html": "<img src=\"a.png\">", "target": ["img"] }]
            }],
            "passes": [{ "id": "document-title", "impact": null, "nodes": [] }],
            "incomplete": [],
            "inapplicable": [],
            "testEngine": { "name": "axe-core", "version": "4.8.2" }
        })
    }

    fn app_with_store() -> (Router, InMemoryAuditStore) {
        let store = InMemoryAuditStore::new();
        let manager = AuditLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(FixedEngine),
            Arc::new(ReportSchemaVerifier::new()),
        );
        (create_app(AppState::new(manager), None), store)
    }

    fn app() -> Router {
        app_with_store().0
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    // ── Root ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn root_reports_liveness() {
        let (status, body) = send(app(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Hello! The a11y-auditor server is running successfully."
        );
    }

    // ── POST /api/audit ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn successful_audit_returns_completed_record() {
        let (app, store) = app_with_store();
        let (status, body) = send(
            app,
            post_json("/api/audit", r#"{"url":"https://example.com"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://example.com");
        assert_eq!(body["status"], "completed");
        assert_eq!(body["results"], engine_report());
        assert!(body["id"].is_string());
        assert!(body["createdAt"].is_string());
        assert!(body["updatedAt"].is_string());
        assert_eq!(store.len(), 1);

        let record: AuditRecord = serde_json::from_value(body).unwrap();
        assert_eq!(record.status(), AuditStatus::Completed);
    }

    #[tokio::test]
    async fn trailing_slash_is_accepted() {
        let (status, body) = send(
            app(),
            post_json("/api/audit/", r#"{"url":"https://example.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
    }

    #[tokio::test]
    async fn missing_or_blank_url_is_rejected_without_a_record() {
        for body in [r#"{}"#, r#"{"url":""}"#, r#"{"url":"   "}"#, r#"{"url":null}"#] {
            let (app, store) = app_with_store();
            let (status, response) = send(app, post_json("/api/audit", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(response, json!({ "message": "URL is required" }), "{body}");
            assert!(store.is_empty(), "{body}");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (app, store) = app_with_store();
        let (status, body) = send(app, post_json("/api/audit", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn scan_failure_returns_500_and_persists_failed_record() {
        let (app, store) = app_with_store();
        let (status, body) = send(
            app,
            post_json("/api/audit", r#"{"url":"https://bad.example"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "message": "Failed to run audit",
                "error": "net::ERR_NAME_NOT_RESOLVED"
            })
        );

        let stored = store_records(&store).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), AuditStatus::Failed);
    }

    #[tokio::test]
    async fn unverifiable_report_is_a_failed_audit() {
        let (app, store) = app_with_store();
        let (status, body) = send(
            app,
            post_json("/api/audit", r#"{"url":"https://garbled.example"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to run audit");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("scan report failed verification"));
        assert_eq!(store_records(&store).await[0].status(), AuditStatus::Failed);
    }

    // ── GET /api/audit ────────────────────────────────────────────────────────

    async fn store_records(store: &InMemoryAuditStore) -> Vec<AuditRecord> {
        store.list_recent(100).await.unwrap()
    }

    #[tokio::test]
    async fn stored_audit_can_be_fetched_by_id() {
        let (app, _store) = app_with_store();
        let (_, created) = send(
            app.clone(),
            post_json("/api/audit", r#"{"url":"https://example.com"}"#),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = send(app, get(&format!("/api/audit/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let (status, body) = send(
            app(),
            get("/api/audit/6f1c2a0e-5a8e-4a53-9f55-8d9a1c1f0b7e"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Audit not found" }));

        let (status, body) = send(app(), get("/api/audit/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn list_returns_recent_records_with_limit() {
        let (app, _store) = app_with_store();
        for n in 0..3 {
            let body = format!(r#"{{"url":"https://example.com/{n}"}}"#);
            let (status, _) = send(app.clone(), post_json("/api/audit", &body)).await;
            assert_eq!(status, StatusCode::OK);
        }
        send(
            app.clone(),
            post_json("/api/audit", r#"{"url":"https://bad.example"}"#),
        )
        .await;

        let (status, all) = send(app.clone(), get("/api/audit")).await;
        assert_eq!(status, StatusCode::OK);
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0]["status"], "failed");

        let (_, limited) = send(app.clone(), get("/api/audit?limit=2")).await;
        assert_eq!(limited.as_array().unwrap().len(), 2);

        let (_, clamped) = send(app, get("/api/audit?limit=0")).await;
        assert_eq!(clamped.as_array().unwrap().len(), 1);
    }

    // ── Static assets ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn static_dir_serves_spa_fallback() {
        let dir = std::env::temp_dir().join(format!(
            "a11y-server-static-{}",
            a11y_contracts::record::AuditId::new()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<!doctype html><title>a11y</title>").unwrap();

        let manager = AuditLifecycleManager::new(
            Arc::new(InMemoryAuditStore::new()),
            Arc::new(FixedEngine),
            Arc::new(ReportSchemaVerifier::new()),
        );
        let app = create_app(AppState::new(manager), Some(&dir));

        let response = app
            .clone()
            .oneshot(get("/history/some-client-route"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("<title>a11y</title>"));

        // API routes still win over the fallback.
        let (status, _) = send(app, get("/")).await;
        assert_eq!(status, StatusCode::OK);

        let _ = std::fs::remove_dir_all(dir);
    }

    // ── Config ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_config_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert!(config.scanner.timeout().is_none());
        assert_eq!(config.socket_addr().await.unwrap().port(), 5000);
    }

    #[tokio::test]
    async fn full_config_parses() {
        let config = ServerConfig::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            static_dir = "client/build"

            [store]
            kind = "file"
            path = "data/audits"

            [scanner]
            program = "/usr/local/bin/a11y-scan"
            args = ["--headless"]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.kind, StoreKind::File);
        assert_eq!(config.scanner.args, vec!["--headless".to_string()]);
        assert_eq!(config.scanner.timeout().unwrap().as_secs(), 30);
        assert_eq!(
            config.socket_addr().await.unwrap().to_string(),
            "127.0.0.1:8080"
        );
    }

    #[tokio::test]
    async fn hostnames_and_ipv6_hosts_resolve() {
        let localhost = ServerConfig::from_toml_str("[server]\nhost = \"localhost\"\nport = 5001")
            .unwrap()
            .socket_addr()
            .await
            .unwrap();
        assert!(localhost.ip().is_loopback());
        assert_eq!(localhost.port(), 5001);

        for host in ["::", "[::1]"] {
            let addr = ServerConfig::from_toml_str(&format!("[server]\nhost = \"{host}\""))
                .unwrap()
                .socket_addr()
                .await
                .unwrap();
            assert!(addr.is_ipv6(), "{host}");
            assert_eq!(addr.port(), 5000, "{host}");
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for toml in [
            "[store]\nkind = \"file\"",
            "[store]\nkind = \"postgres\"",
            "[scanner]\nprogram = \"\"",
            "[scanner]\ntimeout_secs = 0",
            "[server]\nport = \"high\"",
        ] {
            assert!(ServerConfig::from_toml_str(toml).is_err(), "{toml}");
        }
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_config_error() {
        let config =
            ServerConfig::from_toml_str("[server]\nhost = \"not a host.invalid\"").unwrap();
        let err = config.socket_addr().await.unwrap_err();
        assert!(err.to_string().contains("invalid listen address"));
    }

    #[tokio::test]
    async fn build_state_opens_file_store() {
        let dir = std::env::temp_dir().join(format!(
            "a11y-server-store-{}",
            a11y_contracts::record::AuditId::new()
        ));
        let config = ServerConfig::from_toml_str(&format!(
            "[store]\nkind = \"file\"\npath = {:?}",
            dir.display().to_string()
        ))
        .unwrap();

        let state = super::build_state(&config).await.unwrap();
        assert!(state.manager.store().list_recent(5).await.unwrap().is_empty());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir);
    }
}
