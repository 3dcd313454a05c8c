//! Table data endpoint, served by the read-through cache.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    /// Bypass freshness checks and fetch synchronously.
    #[serde(default)]
    pub force: bool,
}

/// GET /api/data - the full table, from cache whenever acceptable.
///
/// The snapshot is serialized straight from the shared `Arc`, so concurrent
/// pollers answer from the same bytes-identical record set.
pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> ApiResult<Response> {
    let snapshot = state.cache.read(query.force).await?;
    let body = serde_json::to_vec(snapshot.as_ref())
        .map_err(|e| ApiError::internal_error(format!("Failed to serialize snapshot: {e}")))?;

    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response())
}
