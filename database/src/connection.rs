use crate::{common::sqlx_error_to_task_error, schema::create_tables};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode},
    ConnectOptions, Connection,
};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use task_core::{
    error::{Result, TaskError},
    store::{ConnectionProvider, StatementHandle},
};
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

/// Number of reconnect attempts before a request fails with storage unavailable
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 3;

/// How long SQLite waits on a locked database file before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection parameters and reconnect policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// SQLite database URL (`sqlite://path`, a bare path, or `:memory:`)
    pub url: String,
    /// Reconnect attempts made when the connection is found dead
    pub reconnect_attempts: u32,
    /// Pause between two reconnect attempts
    pub reconnect_delay: Duration,
    /// How long a statement waits on a locked database file
    pub busy_timeout: Duration,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            reconnect_delay: Duration::ZERO,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect_attempts = attempts;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Whether the URL points at a private in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        if self.is_in_memory() {
            SqliteConnectOptions::new()
                .filename(":memory:")
                .journal_mode(SqliteJournalMode::Memory)
                .busy_timeout(self.busy_timeout)
                .foreign_keys(true)
        } else {
            let path = self
                .url
                .strip_prefix("sqlite://")
                .or_else(|| self.url.strip_prefix("sqlite:"))
                .unwrap_or(&self.url);

            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(self.busy_timeout)
                .foreign_keys(true)
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::new(":memory:")
    }
}

/// Owner of the single process-wide database connection.
///
/// Every request borrows the connection through a [`ConnectionHandle`]. Handles
/// are serialized by an async mutex, so at most one statement is in flight at
/// any time. Before a handle is given out the connection is pinged; a dead
/// connection is replaced by reconnecting up to
/// [`ConnectionSettings::reconnect_attempts`] times.
///
/// # Examples
/// ```rust,no_run
/// use database::{ConnectionManager, ConnectionSettings};
/// use task_core::store::StatementHandle;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = ConnectionManager::connect(ConnectionSettings::new("sqlite:///tmp/tasks.db")).await?;
///
/// let handle = manager.acquire().await?;
/// handle.release().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
    settings: ConnectionSettings,
    options: SqliteConnectOptions,
    connection: Arc<Mutex<Option<SqliteConnection>>>,
    // Set when a handle went away without committing; the next acquire rolls back first
    needs_rollback: Arc<AtomicBool>,
    reconnects: AtomicU64,
}

impl ConnectionManager {
    /// Open the connection at startup.
    ///
    /// No retry happens here: if the first connection cannot be opened the
    /// service cannot start.
    ///
    /// # Returns
    /// * `Ok(ConnectionManager)` - Connected and ready
    /// * `Err(TaskError::StorageUnavailable)` - The database could not be opened
    pub async fn connect(settings: ConnectionSettings) -> Result<Self> {
        let options = settings.connect_options();

        let connection = options.connect().await.map_err(|e| {
            error!(url = %settings.url, error = %e, "Failed to connect to database");
            TaskError::StorageUnavailable(format!("Failed to connect to database: {e}"))
        })?;

        info!(url = %settings.url, "Database connection established");

        Ok(Self {
            settings,
            options,
            connection: Arc::new(Mutex::new(Some(connection))),
            needs_rollback: Arc::new(AtomicBool::new(false)),
            reconnects: AtomicU64::new(0),
        })
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Total reconnect attempts made since startup, successful or not
    pub fn reconnect_attempts_made(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Wait for exclusive use of the connection and open a transaction on it.
    ///
    /// # Returns
    /// * `Ok(ConnectionHandle)` - Handle on a live connection
    /// * `Err(TaskError::StorageUnavailable)` - Every reconnect attempt failed
    pub async fn acquire(&self) -> Result<ConnectionHandle> {
        let mut slot = self.connection.clone().lock_owned().await;

        if !self.is_live(&mut slot).await {
            self.reconnect(&mut slot).await?;
        }

        let mut conn = OwnedMutexGuard::try_map(slot, |slot| slot.as_mut()).map_err(|_| {
            TaskError::StorageUnavailable("Database connection is not open".to_string())
        })?;

        if self.needs_rollback.load(Ordering::SeqCst) {
            debug!("Rolling back writes left by an unreleased handle");
            if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                // No transaction was open; nothing to discard
                debug!(error = %e, "Rollback skipped");
            }
        }

        // Stays set until the handle exists: if this future is dropped while
        // BEGIN is in flight, the next acquire discards the open transaction
        self.needs_rollback.store(true, Ordering::SeqCst);
        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(sqlx_error_to_task_error)?;
        self.needs_rollback.store(false, Ordering::SeqCst);

        debug!("Connection handle acquired");

        Ok(ConnectionHandle {
            conn,
            needs_rollback: self.needs_rollback.clone(),
            released: false,
        })
    }

    /// Close the connection for shutdown.
    ///
    /// A later [`acquire`](Self::acquire) treats the closed connection as dead
    /// and reconnects.
    pub async fn close(&self) -> Result<()> {
        let mut slot = self.connection.lock().await;

        if let Some(conn) = slot.take() {
            conn.close().await.map_err(sqlx_error_to_task_error)?;
            info!("Database connection closed");
        }
        self.needs_rollback.store(false, Ordering::SeqCst);

        Ok(())
    }

    /// Whether the connection is currently live, without reconnecting
    pub async fn is_connected(&self) -> bool {
        let mut slot = self.connection.lock().await;
        self.is_live(&mut slot).await
    }

    /// A connection is live when it answers a ping and, for file databases,
    /// the file it has open is still the one at the configured path.
    async fn is_live(&self, slot: &mut Option<SqliteConnection>) -> bool {
        let Some(conn) = slot.as_mut() else {
            return false;
        };

        if let Err(e) = conn.ping().await {
            warn!(error = %e, "Database connection is not responding");
            return false;
        }

        if !self.settings.is_in_memory() && !self.options.get_filename().exists() {
            warn!(
                path = %self.options.get_filename().display(),
                "Database file has disappeared"
            );
            return false;
        }

        true
    }

    async fn reconnect(&self, slot: &mut Option<SqliteConnection>) -> Result<()> {
        if let Some(stale) = slot.take() {
            let _ = stale.close_hard().await;
        }

        let attempts = self.settings.reconnect_attempts;
        for attempt in 1..=attempts {
            self.reconnects.fetch_add(1, Ordering::SeqCst);

            match self.options.connect().await {
                Ok(mut conn) => match create_tables(&mut conn).await {
                    Ok(()) => {
                        info!(attempt, "Database connection re-established");
                        *slot = Some(conn);
                        // A fresh connection carries no transaction
                        self.needs_rollback.store(false, Ordering::SeqCst);
                        return Ok(());
                    }
                    Err(e) => warn!(attempt, error = %e, "Reconnected database is not usable"),
                },
                Err(e) => warn!(attempt, error = %e, "Reconnect attempt failed"),
            }

            if attempt < attempts && !self.settings.reconnect_delay.is_zero() {
                tokio::time::sleep(self.settings.reconnect_delay).await;
            }
        }

        error!(attempts, "Could not re-establish database connection");
        Err(TaskError::StorageUnavailable(format!(
            "Database unreachable after {attempts} reconnect attempts"
        )))
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("settings", &self.settings)
            .field("reconnects", &self.reconnect_attempts_made())
            .finish()
    }
}

#[async_trait]
impl ConnectionProvider for ConnectionManager {
    type Handle = ConnectionHandle;

    async fn acquire(&self) -> Result<ConnectionHandle> {
        ConnectionManager::acquire(self).await
    }
}

/// Exclusive, transaction-scoped use of the connection for one operation.
///
/// [`release`](StatementHandle::release) commits and unlocks the connection.
/// A handle dropped without being released still unlocks it, and its writes
/// are rolled back when the connection is next acquired.
#[derive(Debug)]
pub struct ConnectionHandle {
    conn: OwnedMappedMutexGuard<Option<SqliteConnection>, SqliteConnection>,
    needs_rollback: Arc<AtomicBool>,
    released: bool,
}

impl ConnectionHandle {
    /// Connection to run statements on
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

#[async_trait]
impl StatementHandle for ConnectionHandle {
    async fn release(mut self) -> Result<()> {
        let result = sqlx::query("COMMIT").execute(&mut *self.conn).await;
        self.released = true;

        match result {
            Ok(_) => {
                debug!("Connection handle released");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Commit failed");
                self.needs_rollback.store(true, Ordering::SeqCst);
                Err(sqlx_error_to_task_error(e))
            }
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!("Connection handle dropped without release; pending writes will be rolled back");
            self.needs_rollback.store(true, Ordering::SeqCst);
        }
    }
}
