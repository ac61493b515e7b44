use axum::response::Json;
use modkit::ApiFailure;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn liveness() -> &'static str {
    "ok"
}

/// JSON 404 for any path no module claimed.
pub async fn not_found() -> ApiFailure {
    ApiFailure::not_found("Not found")
}
