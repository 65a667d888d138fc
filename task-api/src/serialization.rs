//! Response bodies for the task endpoints

use ::task_core::Task;
use serde::Serialize;

pub const TASK_CREATED: &str = "Task created successfully";
pub const TASK_UPDATED: &str = "Task updated successfully";

/// `{"detail": ...}` acknowledgement of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// `{"data": ...}` envelope around returned tasks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

pub type TaskResponse = DataResponse<Task>;
pub type TaskListResponse = DataResponse<Vec<Task>>;

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_task_envelope() {
        let task = Task {
            id: 3,
            name: "Task 3".to_string(),
            description: None,
            category: Some("Study".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        };

        let body = serde_json::to_value(TaskResponse::new(task)).unwrap();
        assert_eq!(body["data"]["id"], 3);
        assert_eq!(body["data"]["name"], "Task 3");
        assert!(body["data"]["description"].is_null());
        assert_eq!(body["data"]["created_at"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn test_detail_and_health() {
        assert_eq!(
            serde_json::to_value(DetailResponse::new(TASK_CREATED)).unwrap(),
            json!({ "detail": "Task created successfully" })
        );
        assert_eq!(
            serde_json::to_value(HealthResponse::ok()).unwrap(),
            json!({ "status": "ok" })
        );
    }
}
