use crate::{
    common::{row_to_task, sqlx_error_to_task_error, TASK_COLUMNS},
    connection::ConnectionHandle,
};
use async_trait::async_trait;
use task_core::{
    error::{Result, TaskError},
    models::{Task, TaskList, ValidatedTask},
    store::{check_rows_affected, Mutation, TaskStore},
};
use tracing::{debug, error};

/// SQLite implementation of the TaskStore trait
///
/// The store is stateless: every operation runs on the connection of the
/// handle it is given, with bound parameters only. Mutations are checked for
/// exactly one affected row.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTaskStore;

impl SqliteTaskStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    type Handle = ConnectionHandle;

    async fn create(&self, handle: &mut ConnectionHandle, task: &ValidatedTask) -> Result<()> {
        let sql = "INSERT INTO tasks (taskname, description, category) VALUES (?, ?, ?)";
        debug!(sql, name = task.name(), "Executing insert");

        let result = sqlx::query(sql)
            .bind(task.name())
            .bind(task.description())
            .bind(task.category())
            .execute(handle.connection())
            .await
            .map_err(sqlx_error_to_task_error)?;

        debug!(rows = result.rows_affected(), "Insert finished");
        checked(Mutation::Create, result.rows_affected())
    }

    async fn get_one(&self, handle: &mut ConnectionHandle, id: i64) -> Result<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
        debug!(sql = %sql, id, "Executing select");

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(handle.connection())
            .await
            .map_err(sqlx_error_to_task_error)?;

        match row {
            Some(row) => row_to_task(&row),
            None => Err(TaskError::not_found_id(id)),
        }
    }

    /// Rows come back in rowid order, which is SQLite's natural scan order for
    /// this table; `ORDER BY id` only makes it explicit so listings are stable.
    async fn get_all(&self, handle: &mut ConnectionHandle) -> Result<TaskList> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id");
        debug!(sql = %sql, "Executing select");

        let rows = sqlx::query(&sql)
            .fetch_all(handle.connection())
            .await
            .map_err(sqlx_error_to_task_error)?;

        debug!(rows = rows.len(), "Select finished");
        if rows.is_empty() {
            return Err(TaskError::NotFound("No tasks yet".to_string()));
        }

        Ok(TaskList::new(rows.into_iter().map(|row| row_to_task(&row))))
    }

    async fn update(
        &self,
        handle: &mut ConnectionHandle,
        id: i64,
        task: &ValidatedTask,
    ) -> Result<()> {
        let sql = "UPDATE tasks SET taskname = ?, description = ?, category = ? WHERE id = ?";
        debug!(sql, id, name = task.name(), "Executing update");

        let result = sqlx::query(sql)
            .bind(task.name())
            .bind(task.description())
            .bind(task.category())
            .bind(id)
            .execute(handle.connection())
            .await
            .map_err(sqlx_error_to_task_error)?;

        debug!(rows = result.rows_affected(), "Update finished");
        checked(Mutation::Update(id), result.rows_affected())
    }

    async fn delete(&self, handle: &mut ConnectionHandle, id: i64) -> Result<()> {
        let sql = "DELETE FROM tasks WHERE id = ?";
        debug!(sql, id, "Executing delete");

        let result = sqlx::query(sql)
            .bind(id)
            .execute(handle.connection())
            .await
            .map_err(sqlx_error_to_task_error)?;

        debug!(rows = result.rows_affected(), "Delete finished");
        checked(Mutation::Delete(id), result.rows_affected())
    }
}

fn checked(mutation: Mutation, rows_affected: u64) -> Result<()> {
    let result = check_rows_affected(mutation, rows_affected);
    if let Err(TaskError::Internal(reason)) = &result {
        error!(%mutation, rows_affected, "Affected row count is not 1: {reason}");
    }
    result
}
