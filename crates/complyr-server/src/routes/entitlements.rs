use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// `GET /api/organizations/{organization_id}/entitlements`
///
/// Advisory usage report. Callers that create records check `remaining`
/// themselves; this route never refuses anything.
#[tracing::instrument(skip(state))]
pub async fn list_entitlements(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.engine.evaluate_entitlements(&organization_id).await?;
    Ok(Json(json!({ "data": report })))
}
