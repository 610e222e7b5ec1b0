use axum::Json;
use serde_json::{Value, json};

/// `GET /healthz`: the process is up.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /readyz`: the process has finished startup and can serve requests.
pub async fn readyz() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}
