use chrono::NaiveDateTime;
use sqlx::{sqlite::SqliteRow, Row};
use task_core::{
    error::{Result, TaskError},
    models::Task,
};

/// Projection shared by every task query
pub const TASK_COLUMNS: &str = "id, taskname, description, category, creation_date";

/// Convert SQLite row to Task model
pub fn row_to_task(row: &SqliteRow) -> Result<Task> {
    let created_at: NaiveDateTime = row
        .try_get("creation_date")
        .map_err(sqlx_error_to_task_error)?;

    Ok(Task {
        id: row.try_get("id").map_err(sqlx_error_to_task_error)?,
        name: row.try_get("taskname").map_err(sqlx_error_to_task_error)?,
        description: row.try_get("description").map_err(sqlx_error_to_task_error)?,
        category: row.try_get("category").map_err(sqlx_error_to_task_error)?,
        created_at: created_at.and_utc(),
    })
}

/// Convert SQLx error to TaskError
pub fn sqlx_error_to_task_error(err: sqlx::Error) -> TaskError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message();

            // Handle SQLite constraint violations
            if db_err.is_unique_violation() || message.contains("UNIQUE constraint failed") {
                TaskError::duplicate_name()
            } else {
                TaskError::Internal(format!("Database constraint error: {message}"))
            }
        }
        sqlx::Error::RowNotFound => {
            // Absence is handled by the store itself, never through this path
            TaskError::Internal("Unexpected RowNotFound error".to_string())
        }
        sqlx::Error::Configuration(cfg_err) => {
            TaskError::StorageUnavailable(format!("Invalid database configuration: {cfg_err}"))
        }
        sqlx::Error::Io(io_err) => {
            TaskError::StorageUnavailable(format!("Database I/O error: {io_err}"))
        }
        sqlx::Error::Tls(tls_err) => {
            TaskError::StorageUnavailable(format!("Database TLS error: {tls_err}"))
        }
        sqlx::Error::Protocol(msg) => {
            TaskError::StorageUnavailable(format!("Database protocol error: {msg}"))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            TaskError::StorageUnavailable("Connection pool unavailable".to_string())
        }
        sqlx::Error::WorkerCrashed => {
            TaskError::StorageUnavailable("Database worker crashed".to_string())
        }
        _ => TaskError::Internal(format!("Database operation failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_storage_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(sqlx_error_to_task_error(sqlx::Error::Io(io)).is_storage_unavailable());
        assert!(sqlx_error_to_task_error(sqlx::Error::PoolTimedOut).is_storage_unavailable());
        assert!(sqlx_error_to_task_error(sqlx::Error::WorkerCrashed).is_storage_unavailable());
        assert!(
            sqlx_error_to_task_error(sqlx::Error::Protocol("bad frame".to_string()))
                .is_storage_unavailable()
        );
    }

    #[test]
    fn test_other_errors_are_internal() {
        assert!(sqlx_error_to_task_error(sqlx::Error::RowNotFound).is_internal());
        assert!(
            sqlx_error_to_task_error(sqlx::Error::ColumnNotFound("taskname".to_string()))
                .is_internal()
        );
    }
}
