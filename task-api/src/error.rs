//! Error handling for the HTTP surface
//!
//! Maps internal task errors and request rejections to status codes and
//! `{"detail": ...}` JSON bodies.

use ::task_core::TaskError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors a request handler can return
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Body is not JSON or does not have the task shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Path segment is not a task ID
    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),
}

impl ApiError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Task(TaskError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Task(TaskError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Task(TaskError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Task(TaskError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Task(TaskError::StorageUnavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(_) | ApiError::InvalidPath(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Convert to the JSON error body
    ///
    /// Server-side failures get a generic message; their details go to the log.
    pub fn to_body(&self) -> Value {
        match self {
            ApiError::Task(TaskError::Validation { field, reason }) => json!({
                "detail": format!("{field} {reason}"),
                "field": field,
            }),
            ApiError::Task(TaskError::Conflict(msg)) | ApiError::Task(TaskError::NotFound(msg)) => {
                json!({ "detail": msg })
            }
            ApiError::Task(TaskError::Internal(_)) => json!({ "detail": "Internal server error" }),
            ApiError::Task(TaskError::StorageUnavailable(_)) => {
                json!({ "detail": "Storage unavailable" })
            }
            ApiError::InvalidBody(msg) | ApiError::InvalidPath(msg) => json!({ "detail": msg }),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (TaskError::validation("name", "too short"), 422),
            (TaskError::duplicate_name(), 409),
            (TaskError::not_found_id(1), 404),
            (TaskError::Internal("2 rows".into()), 500),
            (TaskError::StorageUnavailable("down".into()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(ApiError::from(error).status_code().as_u16(), status);
        }

        assert_eq!(
            ApiError::InvalidBody("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::InvalidPath("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_validation_body_names_field() {
        let error = ApiError::from(TaskError::validation(
            "name",
            "must be at least 3 characters long",
        ));
        let body = error.to_body();

        assert_eq!(body["detail"], "name must be at least 3 characters long");
        assert_eq!(body["field"], "name");
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let body = ApiError::from(TaskError::duplicate_name()).to_body();
        assert_eq!(body, json!({ "detail": "Task with this name already exists" }));

        let body = ApiError::from(TaskError::NotFound("No tasks yet".into())).to_body();
        assert_eq!(body, json!({ "detail": "No tasks yet" }));
    }

    #[test]
    fn test_server_errors_hide_details() {
        let body = ApiError::from(TaskError::Internal("update of task 3 affected 2 rows".into()))
            .to_body();
        assert_eq!(body, json!({ "detail": "Internal server error" }));

        let body = ApiError::from(TaskError::StorageUnavailable("/var/db gone".into())).to_body();
        assert_eq!(body, json!({ "detail": "Storage unavailable" }));
    }
}
