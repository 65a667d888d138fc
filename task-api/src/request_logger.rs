//! Structured request logging middleware for the task HTTP server
//!
//! Emits one tracing event per request with method, path, status, latency and
//! a truncated summary of the JSON body fields.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::{json, Value};
use std::time::Instant;

/// Largest request body read into memory, the same as axum's default body limit
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum length for field values before truncation
const MAX_FIELD_LENGTH: usize = 30;

/// Truncation suffix for long field values
const TRUNCATION_SUFFIX: &str = "...";

/// Request logging middleware
///
/// Logs requests as:
/// `method=POST path=/tasks/ status=201 elapsed_ms=3 fields=name="Task 1", category="Study"`
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => {
            let response = payload_too_large();
            log_request(&method, &path, &response, start_time, "");
            return response;
        }
        Err(BodyError::Unreadable(e)) => {
            // Proceed without the body; the extractor reports the problem
            tracing::warn!(%method, %path, error = %e, "Failed to read request body");
            let response = next.run(Request::from_parts(parts, Body::empty())).await;
            log_request(&method, &path, &response, start_time, "");
            return response;
        }
    };

    let fields = if body_bytes.is_empty() {
        String::new()
    } else {
        match serde_json::from_slice::<Value>(&body_bytes) {
            Ok(json) => format_fields_summary(&json),
            Err(_) => "invalid_json".to_string(),
        }
    };

    let response = next
        .run(Request::from_parts(parts, Body::from(body_bytes)))
        .await;
    log_request(&method, &path, &response, start_time, &fields);

    response
}

#[derive(Debug)]
enum BodyError {
    TooLarge,
    Unreadable(axum::BoxError),
}

/// Buffer the body, stopping as soon as it grows past `limit` bytes
async fn read_body(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge),
        Err(e) => Err(BodyError::Unreadable(e)),
    }
}

fn payload_too_large() -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(json!({ "detail": format!("Request body exceeds {MAX_BODY_BYTES} bytes") })),
    )
        .into_response()
}

fn log_request(
    method: &axum::http::Method,
    path: &str,
    response: &Response,
    start_time: Instant,
    fields: &str,
) {
    let elapsed_ms = start_time.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if fields.is_empty() {
        tracing::info!(%method, path, status, elapsed_ms, "Handled request");
    } else {
        tracing::info!(%method, path, status, elapsed_ms, fields, "Handled request");
    }
}

/// Format body fields into a summary string with truncation
fn format_fields_summary(body: &Value) -> String {
    match body {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}=\"{}\"", format_field_value(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        _ => format_field_value(body),
    }
}

/// Format a single field value with truncation
fn format_field_value(value: &Value) -> String {
    let value_str = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{...{} fields}}", obj.len()),
        Value::Null => "null".to_string(),
    };

    truncate_string(&value_str, MAX_FIELD_LENGTH)
}

/// Truncate string to max length in characters, with suffix
fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let keep = max_length.saturating_sub(TRUNCATION_SUFFIX.len());
        let truncated: String = input.chars().take(keep).collect();
        format!("{truncated}{TRUNCATION_SUFFIX}")
    }
}
