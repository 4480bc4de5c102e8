//! Route handlers for the audit API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use a11y_contracts::{
    error::AuditError,
    record::{AuditId, AuditRecord},
};
use a11y_core::traits::AuditStore;

use crate::{
    errors::{ApiError, ApiResult},
    AppState,
};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello! The a11y-auditor server is running successfully." }))
}

/// `POST /api/audit`
///
/// 200 with the completed record, 400 for a missing URL, 500 when the audit
/// ends `failed` or the store is unavailable.
pub async fn start_audit(
    State(state): State<AppState>,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> ApiResult<Json<AuditRecord>> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let url = request.url.unwrap_or_default();

    let record = state.manager.run_audit(&url).await.map_err(|err| match err {
        AuditError::InvalidInput { reason } => ApiError::bad_request(reason),
        other => {
            warn!(url = %url, error = %other, "audit could not be persisted");
            ApiError::audit_failed(other.to_string())
        }
    })?;

    match record.failure() {
        Some(failure) => Err(ApiError::audit_failed(failure.message.clone())),
        None => {
            info!(audit_id = %record.id, url = %record.url, "audit served");
            Ok(Json(record))
        }
    }
}

/// `GET /api/audit/{id}`
pub async fn get_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AuditRecord>> {
    let id = AuditId::parse(&id)?;
    state
        .manager
        .store()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Audit not found"))
}

/// `GET /api/audit?limit=N`, newest first.
pub async fn list_audits(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<AuditRecord>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let records = state.manager.store().list_recent(limit).await?;
    Ok(Json(records))
}
