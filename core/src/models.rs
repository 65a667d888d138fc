use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A persisted task.
///
/// `id` and `created_at` are assigned by storage when the row is inserted and
/// never change afterwards. Updates only touch `name`, `description` and
/// `category`.
///
/// # Examples
///
/// ```rust
/// use task_core::models::Task;
/// use chrono::Utc;
///
/// let task = Task {
///     id: 1,
///     name: "Task 1".to_string(),
///     description: Some("Draw a picture".to_string()),
///     category: None,
///     created_at: Utc::now(),
/// };
///
/// let json = serde_json::to_value(&task).unwrap();
/// assert_eq!(json["name"], "Task 1");
/// assert!(json["category"].is_null());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Storage-generated primary key
    pub id: i64,
    /// Unique task name
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Optional grouping label
    pub category: Option<String>,
    /// Insertion timestamp, set by storage
    pub created_at: DateTime<Utc>,
}

/// Raw task fields as received from a client.
///
/// Nothing here has been checked yet; run it through
/// [`TaskValidator::validate`](crate::validation::TaskValidator::validate)
/// to obtain a [`ValidatedTask`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInput {
    #[serde(alias = "taskname")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TaskInput {
    /// Create a new input with all fields set
    pub fn new(name: impl Into<String>, description: Option<String>, category: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            category,
        }
    }
}

/// Task fields that passed validation.
///
/// The fields are private and the only constructor lives in the validation
/// module, so holding a `ValidatedTask` proves the constraints were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTask {
    name: String,
    description: Option<String>,
    category: Option<String>,
}

impl ValidatedTask {
    pub(crate) fn new(name: String, description: Option<String>, category: Option<String>) -> Self {
        Self {
            name,
            description,
            category,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Lazily decoded, one-shot sequence of tasks returned by a full listing.
///
/// Items come out in storage order. Each row is decoded only when the
/// iterator reaches it, so a decoding failure surfaces as an `Err` item.
pub struct TaskList {
    rows: Box<dyn Iterator<Item = Result<Task>> + Send>,
}

impl TaskList {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Result<Task>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            rows: Box::new(rows.into_iter()),
        }
    }

    /// Build a list from already decoded tasks
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self::new(tasks.into_iter().map(Ok))
    }

    /// Drain the sequence, stopping at the first decoding error
    pub fn into_vec(self) -> Result<Vec<Task>> {
        self.collect()
    }
}

impl Iterator for TaskList {
    type Item = Result<Task>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl fmt::Debug for TaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskList")
            .field("remaining", &self.rows.size_hint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    fn sample_task(id: i64) -> Task {
        Task {
            id,
            name: format!("Task {id}"),
            description: None,
            category: Some("Study".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_task_json_shape() {
        let task = sample_task(7);
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Task 7");
        assert!(json["description"].is_null());
        assert_eq!(json["category"], "Study");
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_task_input_accepts_taskname_alias() {
        let input: TaskInput =
            serde_json::from_str(r#"{"taskname": "Task 1", "category": "Hobby"}"#).unwrap();
        assert_eq!(input.name, "Task 1");
        assert_eq!(input.description, None);
        assert_eq!(input.category.as_deref(), Some("Hobby"));
    }

    #[test]
    fn test_task_input_requires_name() {
        let result: std::result::Result<TaskInput, _> =
            serde_json::from_str(r#"{"description": "Do homework"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_task_list_is_one_shot() {
        let mut list = TaskList::from_tasks(vec![sample_task(1), sample_task(2)]);
        assert_eq!(list.size_hint(), (2, Some(2)));

        assert_eq!(list.next().unwrap().unwrap().id, 1);
        assert_eq!(list.next().unwrap().unwrap().id, 2);
        assert!(list.next().is_none());
    }

    #[test]
    fn test_task_list_stops_at_first_error() {
        let rows = vec![
            Ok(sample_task(1)),
            Err(TaskError::Internal("bad row".to_string())),
            Ok(sample_task(3)),
        ];
        let result = TaskList::new(rows).into_vec();
        assert_eq!(result, Err(TaskError::Internal("bad row".to_string())));
    }
}
