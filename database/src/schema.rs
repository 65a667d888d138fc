use crate::{common::sqlx_error_to_task_error, connection::ConnectionHandle};
use sqlx::SqliteConnection;
use task_core::error::Result;

/// Table layout the task store reads and writes.
///
/// `taskname` carries the unique constraint that backs duplicate-name
/// detection; `creation_date` is filled in by SQLite on insert.
pub const TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    taskname TEXT NOT NULL UNIQUE,
    description TEXT,
    category TEXT,
    creation_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Create the `tasks` table if it does not exist yet.
///
/// Safe to run on every startup; an existing table is left untouched.
pub async fn ensure_schema(handle: &mut ConnectionHandle) -> Result<()> {
    create_tables(handle.connection()).await?;

    tracing::info!("Database schema is ready");
    Ok(())
}

/// Also run on every reconnect, so a replaced database (a new in-memory
/// one, or a recreated file) is usable straight away.
pub(crate) async fn create_tables(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(TASKS_TABLE)
        .execute(conn)
        .await
        .map_err(sqlx_error_to_task_error)?;
    Ok(())
}
