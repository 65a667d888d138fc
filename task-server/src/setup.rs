use anyhow::{Context, Result};
use database::{ensure_schema, ConnectionManager, SqliteTaskStore, StatementHandle, TaskError};
use std::path::Path;
use std::sync::Arc;
use task_api::TaskServer;
use tracing::info;

use crate::config::Config;

/// Exit code for an invalid or unreadable configuration
pub const EXIT_INVALID_CONFIG: i32 = 1;
/// Exit code when the database cannot be opened at startup
pub const EXIT_STORAGE_UNAVAILABLE: i32 = 2;
/// Exit code for any other startup or serving failure
pub const EXIT_SERVER_ERROR: i32 = 3;

/// Wired application: the connection owner and the HTTP server on top of it
pub struct App {
    pub connections: Arc<ConnectionManager>,
    pub server: TaskServer<ConnectionManager, SqliteTaskStore>,
}

/// Open the database connection and make sure the schema exists
pub async fn create_connection_manager(config: &Config) -> Result<Arc<ConnectionManager>> {
    let settings = config.to_connection_settings();
    info!(url = %settings.url, "Opening database connection");

    let manager = ConnectionManager::connect(settings)
        .await
        .context("Failed to open database")?;

    let mut handle = manager
        .acquire()
        .await
        .context("Failed to acquire database connection")?;
    let outcome = ensure_schema(&mut handle).await;
    handle
        .finish(outcome)
        .await
        .context("Failed to create database schema")?;

    info!("Database ready");
    Ok(Arc::new(manager))
}

/// Initialize the complete application
pub async fn initialize_app(config: &Config) -> Result<App> {
    info!("Initializing application");

    ensure_database_directory(&config.database.url)
        .context("Failed to create database directory")?;

    let connections = create_connection_manager(config).await?;
    let server = TaskServer::new(connections.clone(), Arc::new(SqliteTaskStore::new()));

    info!("Application initialized successfully");
    Ok(App {
        connections,
        server,
    })
}

/// Filesystem path of a file-backed SQLite URL, `None` for in-memory databases
pub fn database_path(database_url: &str) -> Option<&Path> {
    if database_url.contains(":memory:") {
        return None;
    }

    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .filter(|path| !path.is_empty())
        .map(Path::new)
}

/// Ensure the database directory exists with owner-only permissions
pub fn ensure_database_directory(database_url: &str) -> Result<()> {
    let Some(db_path) = database_path(database_url) else {
        return Ok(());
    };

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let permissions = std::fs::Permissions::from_mode(0o700);
                std::fs::set_permissions(parent, permissions)
                    .context("Failed to set directory permissions")?;
            }
        }
    }

    Ok(())
}

/// Map a startup failure to the process exit code
pub fn startup_exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<TaskError>() {
        Some(task_error) if task_error.is_storage_unavailable() => EXIT_STORAGE_UNAVAILABLE,
        _ => EXIT_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_path() {
        assert_eq!(database_path("sqlite://data/tasks.db"), Some(Path::new("data/tasks.db")));
        assert_eq!(database_path("sqlite:tasks.db"), Some(Path::new("tasks.db")));
        assert_eq!(database_path("sqlite::memory:"), None);
        assert_eq!(database_path("sqlite://:memory:"), None);
    }

    #[test]
    fn test_ensure_database_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("subdir").join("test.db");
        let database_url = format!("sqlite://{}", db_path.display());

        ensure_database_directory(&database_url).unwrap();
        assert!(db_path.parent().unwrap().exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(db_path.parent().unwrap())
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_in_memory_needs_no_directory() {
        assert!(ensure_database_directory("sqlite::memory:").is_ok());
        assert!(ensure_database_directory("sqlite:tasks.db").is_ok());
    }

    #[test]
    fn test_startup_exit_code() {
        let storage = anyhow::Error::new(TaskError::StorageUnavailable("down".to_string()))
            .context("Failed to open database");
        assert_eq!(startup_exit_code(&storage), EXIT_STORAGE_UNAVAILABLE);

        let other = anyhow::anyhow!("Address already in use");
        assert_eq!(startup_exit_code(&other), EXIT_SERVER_ERROR);

        let internal = anyhow::Error::new(TaskError::Internal("boom".to_string()));
        assert_eq!(startup_exit_code(&internal), EXIT_SERVER_ERROR);
    }
}
