//! HTTP client for `POST /api/audit`.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use a11y_contracts::{error::AuditError, record::AuditRecord};

/// Everything that can stop a CLI command.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered 400 or 500 with its `{message, error?}` body.
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        error: Option<String>,
    },

    #[error("unexpected response from server (HTTP {status}): {reason}")]
    UnexpectedResponse { status: u16, reason: String },

    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to one auditor server.
#[derive(Debug, Clone)]
pub struct AuditClient {
    http: reqwest::Client,
    base: String,
}

impl AuditClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/audit", self.base)
    }

    /// Ask the server to audit `url` and wait for the finished record.
    pub async fn run_audit(&self, url: &str) -> Result<AuditRecord, ClientError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, url, "requesting audit");

        let response = self
            .http
            .post(&endpoint)
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        interpret_response(status, &body)
    }
}

/// Turn a raw `/api/audit` response into a record or a rejection.
pub fn interpret_response(status: u16, body: &str) -> Result<AuditRecord, ClientError> {
    if status == 200 {
        return serde_json::from_str(body).map_err(|e| ClientError::UnexpectedResponse {
            status,
            reason: format!("body is not an audit record: {}", e),
        });
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { message, error }) => Err(ClientError::Rejected {
            status,
            message,
            error,
        }),
        Err(_) => Err(ClientError::UnexpectedResponse {
            status,
            reason: body.trim().to_string(),
        }),
    }
}
