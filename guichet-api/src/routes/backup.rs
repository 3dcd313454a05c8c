//! Backup listing and the automation-service passthroughs.

use axum::{extract::State, Json};
use guichet_core::BackupEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Accept/reject report for the webhook passthroughs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
    pub details: String,
}

impl TriggerResponse {
    fn success(details: String) -> Self {
        Self {
            status: "success".to_string(),
            details,
        }
    }
}

/// GET /api/list-backups - snapshot descriptors, newest first.
pub async fn list_backups(State(state): State<AppState>) -> ApiResult<Json<Vec<BackupEntry>>> {
    let backups = state.airtable.list_backups().await?;
    Ok(Json(backups))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[serde(default)]
    pub record_id: String,
}

/// POST /api/trigger-restore - restore the named backup.
///
/// Once the automation service accepts, the live table is about to be
/// rewritten under us, so the cache is invalidated before responding.
pub async fn trigger_restore(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> ApiResult<Json<TriggerResponse>> {
    if request.record_id.trim().is_empty() {
        return Err(ApiError::missing_field("recordId"));
    }

    let details = state.automation.trigger_restore(&request.record_id).await?;
    state.cache.invalidate().await;

    Ok(Json(TriggerResponse::success(details)))
}

/// POST /api/trigger-recovery - fire both recovery hooks.
///
/// Success requires both endpoints to accept. The cache is invalidated even
/// on partial failure: one of the two calls may have gone through.
pub async fn trigger_recovery(State(state): State<AppState>) -> ApiResult<Json<TriggerResponse>> {
    let outcome = state.automation.trigger_recovery().await;
    state.cache.invalidate().await;

    let details = outcome?;
    Ok(Json(TriggerResponse::success(details)))
}

/// POST /api/save-snapshot - forward the payload, return the upstream body.
pub async fn save_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    let body = state.automation.save_snapshot(&payload).await?;
    Ok(Json(body))
}
