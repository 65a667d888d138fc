//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Task construction with sensible defaults
//! - TaskInput request bodies

use chrono::{DateTime, Utc};
use task_core::{Task, TaskInput};

/// Builder for constructing Task instances in tests
pub struct TaskBuilder {
    task: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        Self {
            task: Task {
                id: 1,
                name: "Test Task".to_string(),
                description: None,
                category: None,
                created_at: Utc::now(),
            },
        }
    }

    /// Set task ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    /// Set task name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.task.name = name.into();
        self
    }

    /// Set task description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task.description = Some(description.into());
        self
    }

    /// Set task category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.task.category = Some(category.into());
        self
    }

    /// Set creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.task.created_at = created_at;
        self
    }

    /// Build the task
    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for constructing request bodies in tests
pub struct TaskInputBuilder {
    input: TaskInput,
}

impl Default for TaskInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskInputBuilder {
    pub fn new() -> Self {
        Self {
            input: TaskInput::new("Test Task", None, None),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.input.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.input.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.input.category = Some(category.into());
        self
    }

    pub fn build(self) -> TaskInput {
        self.input
    }
}
