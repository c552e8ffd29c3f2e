use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use complyr_core::capability::CapabilityKey;

use crate::{error::AppError, state::AppState};

/// `GET /api/organizations/{organization_id}/capabilities`
///
/// Resolves the full pipeline (base, override registry, trial gate) and
/// returns every capability alongside the subscription it was derived from.
#[tracing::instrument(skip(state))]
pub async fn list_capabilities(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.engine.resolution_for(&organization_id).await?;
    let subscription = &resolution.subscription;

    Ok(Json(json!({
        "data": resolution.capabilities,
        "subscription": {
            "organization_id": subscription.organization_id,
            "plan_tier": subscription.plan_tier,
            "status": subscription.status,
            "trial_expires_at": subscription.trial_expires_at,
            "trial_days_remaining": subscription.trial_days_remaining(Utc::now()),
        }
    })))
}

/// `GET /api/organizations/{organization_id}/capabilities/{key}`
#[tracing::instrument(skip(state))]
pub async fn get_capability(
    State(state): State<Arc<AppState>>,
    Path((organization_id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let key = CapabilityKey::parse(&key).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let enabled = state.engine.has_capability(&organization_id, key).await?;

    Ok(Json(json!({
        "data": { "key": key, "enabled": enabled }
    })))
}
