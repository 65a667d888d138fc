//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Task equality with clear error messages
//! - Error kinds with the offending value in the panic message

use std::fmt::Debug;
use task_core::{Result, Task, TaskError, TaskInput};

/// Assert tasks are equal ignoring timestamps
pub fn assert_task_equals(actual: &Task, expected: &Task) {
    assert_eq!(actual.id, expected.id, "Task IDs don't match");
    assert_eq!(actual.name, expected.name, "Task names don't match");
    assert_eq!(actual.description, expected.description, "Task descriptions don't match");
    assert_eq!(actual.category, expected.category, "Task categories don't match");
    // Note: timestamps are ignored in this assertion
}

/// Assert a stored task carries exactly the fields of the input it was created from
pub fn assert_task_matches_input(task: &Task, input: &TaskInput) {
    assert!(task.id > 0, "Task ID should be positive, got {}", task.id);
    assert_eq!(task.name, input.name, "Task name doesn't match input");
    assert_eq!(task.description, input.description, "Task description doesn't match input");
    assert_eq!(task.category, input.category, "Task category doesn't match input");
}

/// Assert result is a validation error on the given field
pub fn assert_validation_error<T: Debug>(result: &Result<T>, field: &str) {
    match result {
        Err(TaskError::Validation { field: actual, .. }) => assert_eq!(
            actual, field,
            "Validation failed on '{actual}', expected '{field}'"
        ),
        other => panic!("Expected validation error on '{field}', got: {other:?}"),
    }
}

/// Assert result is a NotFound error
pub fn assert_not_found<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(result, Err(TaskError::NotFound(_))),
        "Expected NotFound error, got: {result:?}"
    );
}

/// Assert result is a Conflict error
pub fn assert_conflict<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(result, Err(TaskError::Conflict(_))),
        "Expected Conflict error, got: {result:?}"
    );
}

/// Assert result is an Internal error
pub fn assert_internal<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(result, Err(TaskError::Internal(_))),
        "Expected Internal error, got: {result:?}"
    );
}

/// Assert result is a StorageUnavailable error
pub fn assert_storage_unavailable<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(result, Err(TaskError::StorageUnavailable(_))),
        "Expected StorageUnavailable error, got: {result:?}"
    );
}

/// Assert task IDs are strictly increasing
pub fn assert_ids_ascending(tasks: &[Task]) {
    for pair in tasks.windows(2) {
        assert!(
            pair[0].id < pair[1].id,
            "Tasks out of order: {} before {}",
            pair[0].id,
            pair[1].id
        );
    }
}
