//! Task Core Library
//!
//! This crate provides the domain model, error taxonomy, input validation and
//! the trait seams of the task service. The storage and HTTP crates depend on
//! the types and interfaces defined here.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`models`] - Domain models (Task, TaskInput, ValidatedTask, TaskList)
//! - [`error`] - Error types and result handling
//! - [`store`] - Store and connection traits used by request handlers
//! - [`validation`] - Input validation rules
//!
//! # Example
//!
//! ```rust
//! use task_core::{models::TaskInput, validation::TaskValidator};
//!
//! let input = TaskInput::new(
//!     "Task 1",
//!     Some("Description 1".to_string()),
//!     Some("Category 1".to_string()),
//! );
//!
//! // Validate the input before it reaches storage
//! let task = TaskValidator::validate(&input).unwrap();
//! assert_eq!(task.name(), "Task 1");
//! ```

pub mod error;
pub mod models;
pub mod store;
pub mod validation;

// Re-export commonly used types at the crate root for convenience
pub use error::{Result, TaskError};
pub use models::{Task, TaskInput, TaskList, ValidatedTask};
pub use store::{check_rows_affected, ConnectionProvider, Mutation, StatementHandle, TaskStore};
pub use validation::TaskValidator;

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
