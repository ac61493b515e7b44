//! The JSON envelope every TaskMind endpoint answers with.
//!
//! Success: `{"success": true, ...fields of T}`.
//! Failure: `{"success": false, "message": "...", "warnings": [...]}` where
//! `warnings` is omitted when empty and extra fields may be attached.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

pub type ApiResult<T> = Result<ApiSuccess<T>, ApiFailure>;

/// Successful response; `T` must serialize to a JSON object.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T> {
    status: StatusCode,
    body: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }

    pub fn body(&self) -> &T {
        &self.body
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T> {
    success: bool,
    #[serde(flatten)]
    body: &'a T,
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let envelope = SuccessEnvelope {
            success: true,
            body: &self.body,
        };
        (self.status, Json(envelope)).into_response()
    }
}

/// Failed response with a human readable message.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub warnings: Vec<String>,
    pub extra: Map<String, Value>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            warnings: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Attach an extra top-level field. `success`, `message` and `warnings` are reserved.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !matches!(key, "success" | "message" | "warnings") {
            self.extra.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("message".into(), Value::String(self.message.clone()));
        if !self.warnings.is_empty() {
            body.insert("warnings".into(), self.warnings.clone().into());
        }
        for (k, v) in &self.extra {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn json_of(resp: Response) -> (StatusCode, Value) {
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[derive(Serialize)]
    struct Body {
        task_id: i64,
    }

    #[tokio::test]
    async fn success_flattens_the_body_next_to_the_flag() {
        let (status, v) = json_of(ApiSuccess::created(Body { task_id: 3 }).into_response()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(v, serde_json::json!({ "success": true, "task_id": 3 }));
    }

    #[tokio::test]
    async fn failure_omits_empty_warnings() {
        let (status, v) = json_of(ApiFailure::unauthorized().into_response()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            v,
            serde_json::json!({ "success": false, "message": "Unauthorized" })
        );
    }

    #[tokio::test]
    async fn failure_carries_warnings_and_extra_fields() {
        let failure = ApiFailure::unprocessable("Task has validation warnings")
            .with_warnings(vec!["w1".into()])
            .with_field("intent", "DELETE_TASK")
            .with_field("success", true);
        let (status, v) = json_of(failure.into_response()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v["success"], false);
        assert_eq!(v["warnings"], serde_json::json!(["w1"]));
        assert_eq!(v["intent"], "DELETE_TASK");
    }
}
