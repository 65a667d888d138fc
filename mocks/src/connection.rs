//! Mock implementation of the ConnectionProvider and StatementHandle traits
//!
//! Provides a connection provider with:
//! - A liveness switch and simulated bounded reconnection
//! - Acquire/release accounting to prove handles are always given back
//! - Error injection for acquire and release

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use task_core::{ConnectionProvider, Result, StatementHandle, TaskError};

/// Reconnect attempts the mock makes before giving up, as the real manager does
pub const MOCK_RECONNECT_ATTEMPTS: u32 = 3;

#[derive(Default)]
struct HandleCounters {
    acquired: AtomicUsize,
    released: AtomicUsize,
    dropped: AtomicUsize,
    release_error: Mutex<Option<TaskError>>,
}

/// Mock implementation of ConnectionProvider for testing
///
/// Features:
/// - `set_live(false)` makes the next acquire go through reconnection
/// - `set_reconnect_succeeds(false)` makes reconnection fail every attempt
/// - Counters for acquired, released and dropped-without-release handles
pub struct MockConnectionProvider {
    live: AtomicBool,
    reconnect_succeeds: AtomicBool,
    reconnect_attempts: AtomicU64,
    acquire_error: Mutex<Option<TaskError>>,
    counters: Arc<HandleCounters>,
}

impl Default for MockConnectionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnectionProvider {
    /// Create a provider with a live connection
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            reconnect_succeeds: AtomicBool::new(true),
            reconnect_attempts: AtomicU64::new(0),
            acquire_error: Mutex::new(None),
            counters: Arc::new(HandleCounters::default()),
        }
    }

    /// Create a provider whose storage is down and stays down
    pub fn unavailable() -> Self {
        let provider = Self::new();
        provider.set_live(false);
        provider.set_reconnect_succeeds(false);
        provider
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }

    pub fn set_reconnect_succeeds(&self, succeeds: bool) {
        self.reconnect_succeeds.store(succeeds, Ordering::SeqCst);
    }

    /// Inject error for next acquire
    pub fn inject_acquire_error(&self, error: TaskError) {
        *self.acquire_error.lock() = Some(error);
    }

    /// Inject error for next release
    pub fn inject_release_error(&self, error: TaskError) {
        *self.counters.release_error.lock() = Some(error);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn reconnect_attempts_made(&self) -> u64 {
        self.reconnect_attempts.load(Ordering::SeqCst)
    }

    pub fn acquired_count(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Handles dropped without release
    pub fn dropped_count(&self) -> usize {
        self.counters.dropped.load(Ordering::SeqCst)
    }

    /// Handles currently held by callers
    pub fn outstanding(&self) -> usize {
        self.acquired_count() - self.released_count() - self.dropped_count()
    }

    /// Assert every acquired handle was explicitly released
    pub fn assert_all_released(&self) {
        assert_eq!(
            self.acquired_count(),
            self.released_count(),
            "{} handle(s) acquired, {} released, {} dropped without release",
            self.acquired_count(),
            self.released_count(),
            self.dropped_count()
        );
    }

    fn reconnect(&self) -> Result<()> {
        for _ in 0..MOCK_RECONNECT_ATTEMPTS {
            self.reconnect_attempts.fetch_add(1, Ordering::SeqCst);
            if self.reconnect_succeeds.load(Ordering::SeqCst) {
                self.set_live(true);
                return Ok(());
            }
        }

        Err(TaskError::StorageUnavailable(format!(
            "Database unreachable after {MOCK_RECONNECT_ATTEMPTS} reconnect attempts"
        )))
    }
}

#[async_trait]
impl ConnectionProvider for MockConnectionProvider {
    type Handle = MockHandle;

    async fn acquire(&self) -> Result<MockHandle> {
        if let Some(error) = self.acquire_error.lock().take() {
            return Err(error);
        }

        if !self.is_live() {
            self.reconnect()?;
        }

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockHandle {
            counters: self.counters.clone(),
            released: false,
        })
    }
}

/// Handle issued by [`MockConnectionProvider`]
pub struct MockHandle {
    counters: Arc<HandleCounters>,
    released: bool,
}

impl MockHandle {
    /// A handle not tied to any provider, for driving a store directly
    pub fn detached() -> Self {
        Self {
            counters: Arc::new(HandleCounters::default()),
            released: false,
        }
    }
}

#[async_trait]
impl StatementHandle for MockHandle {
    async fn release(mut self) -> Result<()> {
        self.released = true;
        self.counters.released.fetch_add(1, Ordering::SeqCst);

        match self.counters.release_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if !self.released {
            self.counters.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reconnect_restores_liveness() {
        let provider = MockConnectionProvider::new();
        provider.set_live(false);

        let handle = provider.acquire().await.unwrap();
        handle.release().await.unwrap();

        assert!(provider.is_live());
        assert_eq!(provider.reconnect_attempts_made(), 1);
        provider.assert_all_released();
    }

    #[tokio::test]
    async fn test_reconnect_is_bounded() {
        let provider = MockConnectionProvider::unavailable();

        let error = provider.acquire().await.err().unwrap();
        assert!(error.is_storage_unavailable());
        assert_eq!(provider.reconnect_attempts_made(), 3);
        assert_eq!(provider.acquired_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_handle_is_counted() {
        let provider = MockConnectionProvider::new();
        drop(provider.acquire().await.unwrap());

        assert_eq!(provider.dropped_count(), 1);
        assert_eq!(provider.outstanding(), 0);
    }
}
