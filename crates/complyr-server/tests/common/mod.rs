#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use complyr_core::config::Config;
use complyr_metadata::InMemoryStore;
use complyr_server::app::build_app;
use complyr_server::state::AppState;

pub const FIXTURE: &str = r#"{
    "subscriptions": [
        { "organization_id": "org_basic", "plan_tier": "basic", "status": "active" },
        { "organization_id": "org_pro", "plan_tier": "pro", "status": "active" },
        { "organization_id": "org_late", "plan_tier": "pro", "status": "past_due" },
        { "organization_id": "org_gone", "plan_tier": "premium", "status": "expired" },
        {
            "organization_id": "org_trial",
            "plan_tier": "premium",
            "status": "trial_active",
            "trial_started_at": "2026-01-01T00:00:00Z",
            "trial_expires_at": "2026-01-15T00:00:00Z"
        }
    ],
    "rules": [
        { "feature_key": "block.timeline", "minimum_plan": "premium" }
    ],
    "usage": [
        { "organization_id": "org_basic", "entitlement_key": "published_records", "count": 9 }
    ]
}"#;

pub fn test_config() -> Config {
    Config {
        port: 0,
        fixture_path: None,
        trial_days: 14,
        cors_origins: vec![],
    }
}

pub fn setup() -> (Arc<AppState>, axum::Router) {
    let store = InMemoryStore::from_fixture_json(FIXTURE).expect("fixture loads");
    let state = Arc::new(AppState::new(store, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

pub async fn get(app: &axum::Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

pub async fn post_json(app: &axum::Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}
