use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{Result, TaskError},
    models::{TaskInput, ValidatedTask},
};

/// Minimum task name length, in characters
pub const NAME_MIN_LEN: usize = 3;
/// Maximum task name length, in characters
pub const NAME_MAX_LEN: usize = 100;
/// Maximum description length, in characters
pub const DESCRIPTION_MAX_LEN: usize = 500;
/// Maximum category length, in characters
pub const CATEGORY_MAX_LEN: usize = 100;

/// Latin and Cyrillic letters, ASCII digits, space and underscore
const ALLOWED_PATTERN: &str = r"^[a-zA-Zа-яА-ЯёЁ0-9 _]+$";

fn allowed_chars() -> &'static Regex {
    static ALLOWED: OnceLock<Regex> = OnceLock::new();
    ALLOWED.get_or_init(|| Regex::new(ALLOWED_PATTERN).expect("allowed character pattern is valid"))
}

/// Validation utilities for task input
pub struct TaskValidator;

impl TaskValidator {
    /// Validate raw task input
    ///
    /// Checks run in field order (name, description, category) and the first
    /// failure is returned. Absent optional fields stay absent; they are never
    /// turned into empty strings.
    ///
    /// # Arguments
    /// * `input` - The raw fields received from the client
    ///
    /// # Returns
    /// * `Ok(ValidatedTask)` - If every field is valid
    /// * `Err(TaskError::Validation)` - Naming the first invalid field
    pub fn validate(input: &TaskInput) -> Result<ValidatedTask> {
        Self::validate_name(&input.name)?;
        if let Some(description) = &input.description {
            Self::validate_description(description)?;
        }
        if let Some(category) = &input.category {
            Self::validate_category(category)?;
        }

        Ok(ValidatedTask::new(
            input.name.clone(),
            input.description.clone(),
            input.category.clone(),
        ))
    }

    /// Validate a task name
    ///
    /// Task names must:
    /// - Be 3-100 characters long
    /// - Contain only letters (Latin or Cyrillic), digits, spaces and underscores
    pub fn validate_name(name: &str) -> Result<()> {
        let len = name.chars().count();

        if len < NAME_MIN_LEN {
            return Err(TaskError::validation(
                "name",
                format!("must be at least {NAME_MIN_LEN} characters long"),
            ));
        }

        if len > NAME_MAX_LEN {
            return Err(TaskError::validation(
                "name",
                format!("must be at most {NAME_MAX_LEN} characters long"),
            ));
        }

        Self::check_charset("name", name)
    }

    /// Validate a task description (at most 500 characters, same character set)
    pub fn validate_description(description: &str) -> Result<()> {
        Self::validate_optional("description", description, DESCRIPTION_MAX_LEN)
    }

    /// Validate a task category (at most 100 characters, same character set)
    pub fn validate_category(category: &str) -> Result<()> {
        Self::validate_optional("category", category, CATEGORY_MAX_LEN)
    }

    fn validate_optional(field: &str, value: &str, max_len: usize) -> Result<()> {
        if value.chars().count() > max_len {
            return Err(TaskError::validation(
                field,
                format!("must be at most {max_len} characters long"),
            ));
        }

        Self::check_charset(field, value)
    }

    fn check_charset(field: &str, value: &str) -> Result<()> {
        if allowed_chars().is_match(value) {
            Ok(())
        } else {
            Err(TaskError::validation(
                field,
                "can only contain letters, digits, spaces and underscores",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> TaskInput {
        TaskInput::new(name, None, None)
    }

    #[test]
    fn test_name_length_boundaries() {
        assert!(TaskValidator::validate(&input("ab")).is_err());
        assert!(TaskValidator::validate(&input("abc")).is_ok());
        assert!(TaskValidator::validate(&input(&"a".repeat(100))).is_ok());
        assert!(TaskValidator::validate(&input(&"a".repeat(101))).is_err());
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        // 100 Cyrillic letters are 200 bytes of UTF-8
        assert!(TaskValidator::validate(&input(&"я".repeat(100))).is_ok());
        assert!(TaskValidator::validate(&input(&"я".repeat(101))).is_err());
    }

    #[test]
    fn test_valid_names() {
        assert!(TaskValidator::validate_name("Task 1").is_ok());
        assert!(TaskValidator::validate_name("Student Work 15").is_ok());
        assert!(TaskValidator::validate_name("snake_case_name").is_ok());
        assert!(TaskValidator::validate_name("Задача номер 1").is_ok());
        assert!(TaskValidator::validate_name("Ёлка").is_ok());
        assert!(TaskValidator::validate_name("abc123").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        // Punctuation
        assert!(TaskValidator::validate_name("abc!").is_err());
        assert!(TaskValidator::validate_name("it's a task").is_err());
        assert!(TaskValidator::validate_name("a-b-c").is_err());

        // Other scripts
        assert!(TaskValidator::validate_name("Ärger").is_err());
        assert!(TaskValidator::validate_name("任务任务").is_err());

        // Whitespace other than a plain space
        assert!(TaskValidator::validate_name("tab\there").is_err());
        assert!(TaskValidator::validate_name("line\nbreak").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let error = TaskValidator::validate(&input("ab")).unwrap_err();
        assert_eq!(error.field(), Some("name"));

        let error = TaskValidator::validate(&TaskInput::new(
            "Task 1",
            Some("Draw a picture!".to_string()),
            None,
        ))
        .unwrap_err();
        assert_eq!(error.field(), Some("description"));

        let error = TaskValidator::validate(&TaskInput::new(
            "Task 1",
            None,
            Some("c".repeat(101)),
        ))
        .unwrap_err();
        assert_eq!(error.field(), Some("category"));
    }

    #[test]
    fn test_optional_field_limits() {
        assert!(TaskValidator::validate_description(&"d".repeat(500)).is_ok());
        assert!(TaskValidator::validate_description(&"d".repeat(501)).is_err());
        assert!(TaskValidator::validate_category(&"c".repeat(100)).is_ok());
        assert!(TaskValidator::validate_category(&"c".repeat(101)).is_err());
    }

    #[test]
    fn test_absent_is_not_empty() {
        let validated = TaskValidator::validate(&input("Task 1")).unwrap();
        assert_eq!(validated.description(), None);
        assert_eq!(validated.category(), None);

        // A present but empty value does not match the pattern
        let result = TaskValidator::validate(&TaskInput::new("Task 1", Some(String::new()), None));
        assert!(result.is_err());
    }

    #[test]
    fn test_validated_task_keeps_values() {
        let validated = TaskValidator::validate(&TaskInput::new(
            "Task 1",
            Some("Description 1".to_string()),
            Some("Category 1".to_string()),
        ))
        .unwrap();

        assert_eq!(validated.name(), "Task 1");
        assert_eq!(validated.description(), Some("Description 1"));
        assert_eq!(validated.category(), Some("Category 1"));
    }
}
