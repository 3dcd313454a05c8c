//! Inline record updates.
//!
//! A single numeric cell edit from the dashboard: validated against the
//! column catalog, pushed upstream, then the cache is invalidated so the
//! editor's next poll reflects their own change.

use axum::{extract::State, Json};
use guichet_core::catalog;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub field_name: String,
    /// New cell value: a number, or null to clear the cell.
    #[serde(default)]
    pub value: Value,
}

/// PATCH /api/update-record - write one field of one record.
///
/// Unknown and computed columns are rejected before any upstream traffic.
/// On upstream success the cache is invalidated exactly once, before the
/// response goes out, so a follow-up read cannot serve the superseded
/// snapshot. Upstream rejections pass through with the upstream's status and
/// body; the dashboard uses them to roll back its optimistic edit.
pub async fn update_record(
    State(state): State<AppState>,
    Json(request): Json<UpdateRecordRequest>,
) -> ApiResult<Json<Value>> {
    if request.record_id.trim().is_empty() {
        return Err(ApiError::missing_field("recordId"));
    }
    if request.field_name.trim().is_empty() {
        return Err(ApiError::missing_field("fieldName"));
    }

    let Some(spec) = catalog::column(&request.field_name) else {
        return Err(ApiError::invalid_input(format!(
            "Unknown column '{}'",
            request.field_name
        )));
    };
    if !spec.editable {
        return Err(ApiError::field_not_editable(&request.field_name));
    }
    if !(request.value.is_number() || request.value.is_null()) {
        return Err(ApiError::invalid_input(
            "Field value must be a number or null",
        ));
    }

    tracing::info!(
        record_id = %request.record_id,
        field = %request.field_name,
        "updating record field"
    );

    let updated = state
        .airtable
        .update_field(&request.record_id, &request.field_name, &request.value)
        .await?;

    state.cache.invalidate().await;

    Ok(Json(updated))
}
