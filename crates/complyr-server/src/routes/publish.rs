use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use complyr_core::content::ContentDocument;

use crate::{error::AppError, state::AppState};

/// `POST /api/organizations/{organization_id}/publish/validate`
///
/// Returns `200` with the validation result when the document may be
/// published, `422` with the full error list otherwise.
#[tracing::instrument(skip(state, document))]
pub async fn validate_publish(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
    Json(document): Json<ContentDocument>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .engine
        .validate_content_for_publishing(&document, &organization_id)
        .await?;

    let status = if result.valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(json!({ "data": result }))))
}
