use thiserror::Error;

/// Result type alias for task operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Error taxonomy for the task service.
///
/// Every failure a request can run into, from rejected input to a lost
/// database connection, is one of these variants. Each maps to exactly one
/// HTTP status code so the request boundary never has to guess.
///
/// # Examples
///
/// ```rust
/// use task_core::error::TaskError;
///
/// let not_found = TaskError::not_found_id(42);
/// assert!(not_found.is_not_found());
/// assert_eq!(not_found.status_code(), 404);
///
/// let invalid = TaskError::validation("name", "must be at least 3 characters long");
/// assert_eq!(invalid.field(), Some("name"));
/// assert_eq!(invalid.status_code(), 422);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Input failed a shape, pattern or length constraint
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Uniqueness constraint violated in storage
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No row matches the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// An integrity post-condition failed; a bug or concurrent mutation
    #[error("Internal error: {0}")]
    Internal(String),

    /// The connection could not be established or re-established
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl TaskError {
    /// Create a validation error for a single field
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a not found error for a task ID
    pub fn not_found_id(id: i64) -> Self {
        Self::NotFound(format!("Task with ID {id} not found"))
    }

    /// Create the conflict error raised for a duplicate task name
    pub fn duplicate_name() -> Self {
        Self::Conflict("Task with this name already exists".to_string())
    }

    /// Field that failed validation, if this is a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            TaskError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound(_))
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation { .. })
    }

    /// Check if this error indicates a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, TaskError::Conflict(_))
    }

    /// Check if this error indicates a broken integrity post-condition
    pub fn is_internal(&self) -> bool {
        matches!(self, TaskError::Internal(_))
    }

    /// Check if this error indicates the storage cannot be reached
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, TaskError::StorageUnavailable(_))
    }

    /// Convert to appropriate HTTP status code equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::Validation { .. } => 422,
            TaskError::Conflict(_) => 409,
            TaskError::NotFound(_) => 404,
            TaskError::Internal(_) => 500,
            TaskError::StorageUnavailable(_) => 500,
        }
    }
}
