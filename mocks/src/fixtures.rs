//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - Standard tasks and request inputs
//! - Boundary and edge case names
//! - Bulk task generators

use chrono::Utc;
use task_core::{Task, TaskInput, TaskValidator, ValidatedTask};

/// Create a basic test task with sensible defaults
pub fn create_test_task() -> Task {
    Task {
        id: 1,
        name: "Task 1".to_string(),
        description: Some("Description 1".to_string()),
        category: Some("Category 1".to_string()),
        created_at: Utc::now(),
    }
}

/// Create multiple unique tasks with IDs starting at 1
pub fn create_test_tasks(count: usize) -> Vec<Task> {
    (1..=count)
        .map(|i| Task {
            id: i as i64,
            name: format!("Task {i}"),
            description: (i % 2 == 0).then(|| format!("Description {i}")),
            category: (i % 3 == 0).then(|| "Study".to_string()),
            created_at: Utc::now(),
        })
        .collect()
}

/// Raw input with every field set
pub fn create_task_input() -> TaskInput {
    TaskInput::new(
        "Task 1",
        Some("Description 1".to_string()),
        Some("Category 1".to_string()),
    )
}

/// Raw input with only a name
pub fn create_name_only_input(name: &str) -> TaskInput {
    TaskInput::new(name, None, None)
}

/// Validated fields for driving a store directly
///
/// Panics when `name` is not a valid task name.
pub fn create_validated_task(name: &str) -> ValidatedTask {
    TaskValidator::validate(&create_name_only_input(name))
        .unwrap_or_else(|e| panic!("fixture name {name:?} is invalid: {e}"))
}

/// Names at and around the length limits, paired with whether they are valid
pub fn boundary_names() -> Vec<(String, bool)> {
    vec![
        ("ab".to_string(), false),
        ("abc".to_string(), true),
        ("a".repeat(100), true),
        ("a".repeat(101), false),
        ("я".repeat(100), true),
        (String::new(), false),
    ]
}

/// Names that must be rejected for their characters
pub fn invalid_charset_names() -> Vec<&'static str> {
    vec![
        "abc!",
        "Robert'); DROP TABLE tasks;--",
        "task-name",
        "path/to",
        "tab\tname",
        "emoji 🙂",
        "Größe",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_agree_with_validator() {
        assert!(TaskValidator::validate(&create_task_input()).is_ok());

        for (name, valid) in boundary_names() {
            let result = TaskValidator::validate(&create_name_only_input(&name));
            assert_eq!(result.is_ok(), valid, "name of {} chars", name.chars().count());
        }

        for name in invalid_charset_names() {
            assert!(TaskValidator::validate(&create_name_only_input(name)).is_err());
        }
    }

    #[test]
    fn test_bulk_tasks_are_unique() {
        let tasks = create_test_tasks(10);
        let mut names: Vec<_> = tasks.iter().map(|task| task.name.clone()).collect();
        names.dedup();
        assert_eq!(names.len(), 10);
        assert_eq!(tasks.last().unwrap().id, 10);
    }
}
