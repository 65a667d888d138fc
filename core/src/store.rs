use async_trait::async_trait;
use std::fmt;

use crate::{
    error::{Result, TaskError},
    models::{Task, TaskList, ValidatedTask},
};

/// Scoped access to the storage connection for a single operation.
///
/// A handle is exclusively owned by one request. It must be given back with
/// [`release`](StatementHandle::release) or
/// [`finish`](StatementHandle::finish) once the operation is over, on success
/// and on failure alike.
#[async_trait]
pub trait StatementHandle: Send + Sized {
    /// Commit pending writes and give the connection back
    ///
    /// # Returns
    /// * `Ok(())` - Writes committed, connection returned
    /// * `Err(TaskError::StorageUnavailable)` - The commit could not reach storage
    async fn release(self) -> Result<()>;

    /// Release the handle, then hand back the outcome of the operation.
    ///
    /// Release happens whatever the outcome was. A release failure only
    /// replaces a successful outcome; an operation error always wins.
    async fn finish<T: Send>(self, outcome: Result<T>) -> Result<T> {
        let released = self.release().await;
        match outcome {
            Ok(value) => released.map(|()| value),
            Err(error) => Err(error),
        }
    }
}

/// Source of statement handles, the seam between request handlers and the
/// connection lifecycle.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Handle: StatementHandle;

    /// Obtain a handle on a live connection
    ///
    /// # Returns
    /// * `Ok(Handle)` - A handle ready for one operation
    /// * `Err(TaskError::StorageUnavailable)` - Storage is unreachable, even after reconnecting
    async fn acquire(&self) -> Result<Self::Handle>;

    /// Verify storage is reachable by taking and releasing a handle
    async fn health_check(&self) -> Result<()> {
        self.acquire().await?.release().await
    }
}

/// CRUD operations over the `tasks` table.
///
/// Implementations hold no connection of their own; every call borrows the
/// caller's handle. Mutating operations check the affected-row count and
/// fail rather than trust a statement that touched the wrong number of rows.
#[async_trait]
pub trait TaskStore: Send + Sync {
    type Handle: Send;

    /// Insert a new task
    ///
    /// # Arguments
    /// * `handle` - Handle to execute on
    /// * `task` - Validated fields; `id` and `created_at` come from storage
    ///
    /// # Returns
    /// * `Ok(())` - Exactly one row was inserted
    /// * `Err(TaskError::Conflict)` - The name is already taken
    /// * `Err(TaskError::Internal)` - The insert did not affect exactly one row
    async fn create(&self, handle: &mut Self::Handle, task: &ValidatedTask) -> Result<()>;

    /// Fetch one task by ID
    ///
    /// # Returns
    /// * `Ok(Task)` - The matching task
    /// * `Err(TaskError::NotFound)` - No row matches
    async fn get_one(&self, handle: &mut Self::Handle, id: i64) -> Result<Task>;

    /// Fetch every task in storage order
    ///
    /// # Returns
    /// * `Ok(TaskList)` - A non-empty, one-shot sequence of tasks
    /// * `Err(TaskError::NotFound)` - The table has no rows
    async fn get_all(&self, handle: &mut Self::Handle) -> Result<TaskList>;

    /// Overwrite name, description and category of an existing task
    ///
    /// # Returns
    /// * `Ok(())` - Exactly one row was updated
    /// * `Err(TaskError::Conflict)` - The new name collides with another task
    /// * `Err(TaskError::NotFound)` - No row matches the ID
    /// * `Err(TaskError::Internal)` - More than one row was updated
    async fn update(&self, handle: &mut Self::Handle, id: i64, task: &ValidatedTask) -> Result<()>;

    /// Remove a task
    ///
    /// # Returns
    /// * `Ok(())` - Exactly one row was deleted
    /// * `Err(TaskError::NotFound)` - No row matches the ID
    /// * `Err(TaskError::Internal)` - More than one row was deleted
    async fn delete(&self, handle: &mut Self::Handle, id: i64) -> Result<()>;
}

/// Mutating statement whose affected-row count is being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update(i64),
    Delete(i64),
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create => write!(f, "insert"),
            Mutation::Update(id) => write!(f, "update of task {id}"),
            Mutation::Delete(id) => write!(f, "delete of task {id}"),
        }
    }
}

/// Interpret the affected-row count of a mutating statement.
///
/// Exactly one row is the only success. Zero rows on update or delete means
/// the ID does not exist; any other count is an integrity failure.
pub fn check_rows_affected(mutation: Mutation, rows_affected: u64) -> Result<()> {
    match (mutation, rows_affected) {
        (_, 1) => Ok(()),
        (Mutation::Update(id) | Mutation::Delete(id), 0) => Err(TaskError::not_found_id(id)),
        (mutation, rows) => Err(TaskError::Internal(format!(
            "Unknown database error: {mutation} affected {rows} rows, expected exactly 1"
        ))),
    }
}
