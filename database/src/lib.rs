//! Database crate for the task service
//!
//! This crate owns the single SQLite connection of the process and implements
//! the TaskStore trait on top of it.
//!
//! # Features
//!
//! - One shared connection, serialized per request through [`ConnectionHandle`]
//! - Liveness check before every request with bounded reconnection
//! - Commit on release, rollback of writes left by dropped handles
//! - Parameterized statements only, with affected-row checks on every mutation
//! - Idempotent schema bootstrap
//!
//! # Usage
//!
//! ```rust
//! use database::{ensure_schema, ConnectionManager, ConnectionSettings, SqliteTaskStore};
//! use task_core::{store::{StatementHandle, TaskStore}, TaskInput, TaskValidator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ConnectionManager::connect(ConnectionSettings::new(":memory:")).await?;
//!     let store = SqliteTaskStore::new();
//!
//!     let mut handle = manager.acquire().await?;
//!     ensure_schema(&mut handle).await?;
//!
//!     let task = TaskValidator::validate(&TaskInput::new("Task 1", None, None))?;
//!     let outcome = store.create(&mut handle, &task).await;
//!     handle.finish(outcome).await?;
//!
//!     Ok(())
//! }
//! ```

mod common;
mod connection;
mod schema;
mod sqlite;

pub use connection::{
    ConnectionHandle, ConnectionManager, ConnectionSettings, DEFAULT_BUSY_TIMEOUT,
    DEFAULT_RECONNECT_ATTEMPTS,
};
pub use schema::{ensure_schema, TASKS_TABLE};
pub use sqlite::SqliteTaskStore;

// Re-export commonly used types from task-core for convenience
pub use task_core::{
    error::{Result, TaskError},
    models::{Task, TaskList, ValidatedTask},
    store::{check_rows_affected, ConnectionProvider, Mutation, StatementHandle, TaskStore},
};
