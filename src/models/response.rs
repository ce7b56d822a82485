//! Outbound response value

use http::StatusCode;
use serde_json::{json, Map, Value};

/// A response flowing back up through the pipeline.
///
/// `body` is the payload; the status is kept separately and merged in by
/// [`Response::to_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 201 with `body`.
    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    /// An error response with body `{"error": message}`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    /// The dispatcher's route-miss response.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "Not found")
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Flattens into `{"status": code, ...body}`.
    ///
    /// Object bodies are merged; any other body is placed under `"data"`.
    /// A `"status"` field in the body is overridden.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        match &self.body {
            Value::Object(fields) => out.extend(fields.clone()),
            Value::Null => {}
            other => {
                out.insert("data".to_string(), other.clone());
            }
        }
        out.insert("status".to_string(), json!(self.status.as_u16()));
        Value::Object(out)
    }
}
