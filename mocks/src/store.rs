//! Mock implementation of the TaskStore trait
//!
//! Provides an in-memory store with:
//! - Unique-name enforcement like the real table
//! - Forced affected-row counts to exercise the integrity checks
//! - Error injection capabilities
//! - Call tracking for verification

use crate::connection::MockHandle;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use task_core::{
    check_rows_affected, Mutation, Result, Task, TaskError, TaskList, TaskStore, ValidatedTask,
};

/// Mock implementation of TaskStore for testing
///
/// Features:
/// - Thread-safe concurrent access
/// - Tasks kept in ID order, IDs never reused
/// - Error injection for failure testing
/// - Call history tracking for verification
pub struct MockTaskStore {
    tasks: Mutex<BTreeMap<i64, Task>>,
    next_id: AtomicI64,
    error_injection: Mutex<Option<TaskError>>,
    forced_rows: Mutex<Option<u64>>,
    call_history: Mutex<Vec<String>>,
}

impl Default for MockTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Create mock store with pre-populated tasks
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let max_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);

        Self {
            tasks: Mutex::new(tasks.into_iter().map(|task| (task.id, task)).collect()),
            next_id: AtomicI64::new(max_id + 1),
            error_injection: Mutex::new(None),
            forced_rows: Mutex::new(None),
            call_history: Mutex::new(Vec::new()),
        }
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear error injection
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Report `rows` affected rows for the next mutation, whatever it really did.
    ///
    /// The mutation is only applied when the real effect is one row and the
    /// forced count passes the check.
    pub fn force_rows_affected(&self, rows: u64) {
        *self.forced_rows.lock() = Some(rows);
    }

    /// Snapshot of stored tasks in ID order
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.starts_with(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Assert no method was called at all
    pub fn assert_untouched(&self) {
        let history = self.call_history.lock();
        assert!(history.is_empty(), "Store was called: {:?}", *history);
    }

    /// Check if an error should be injected, consuming it if so
    fn check_error_injection(&self) -> Result<()> {
        match self.error_injection.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Record method call with parameters in history
    fn record_call(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }

    /// Affected rows to report, and whether the change should really happen
    fn rows_affected(&self, mutation: Mutation, actual: u64) -> Result<bool> {
        let reported = self.forced_rows.lock().take().unwrap_or(actual);
        check_rows_affected(mutation, reported)?;
        Ok(actual == 1)
    }

    fn name_taken(tasks: &BTreeMap<i64, Task>, name: &str, except: Option<i64>) -> bool {
        tasks
            .values()
            .any(|task| task.name == name && Some(task.id) != except)
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    type Handle = MockHandle;

    async fn create(&self, _handle: &mut MockHandle, task: &ValidatedTask) -> Result<()> {
        self.record_call("create", &format!("name={}", task.name()));
        self.check_error_injection()?;

        let mut tasks = self.tasks.lock();
        if Self::name_taken(&tasks, task.name(), None) {
            return Err(TaskError::duplicate_name());
        }

        if self.rows_affected(Mutation::Create, 1)? {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            tasks.insert(
                id,
                Task {
                    id,
                    name: task.name().to_string(),
                    description: task.description().map(str::to_string),
                    category: task.category().map(str::to_string),
                    created_at: Utc::now(),
                },
            );
        }

        Ok(())
    }

    async fn get_one(&self, _handle: &mut MockHandle, id: i64) -> Result<Task> {
        self.record_call("get_one", &format!("id={id}"));
        self.check_error_injection()?;

        self.tasks
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| TaskError::not_found_id(id))
    }

    async fn get_all(&self, _handle: &mut MockHandle) -> Result<TaskList> {
        self.record_call("get_all", "");
        self.check_error_injection()?;

        let tasks = self.tasks();
        if tasks.is_empty() {
            return Err(TaskError::NotFound("No tasks yet".to_string()));
        }

        Ok(TaskList::from_tasks(tasks))
    }

    async fn update(&self, _handle: &mut MockHandle, id: i64, task: &ValidatedTask) -> Result<()> {
        self.record_call("update", &format!("id={id}, name={}", task.name()));
        self.check_error_injection()?;

        let mut tasks = self.tasks.lock();
        if Self::name_taken(&tasks, task.name(), Some(id)) {
            return Err(TaskError::duplicate_name());
        }

        let actual = u64::from(tasks.contains_key(&id));
        if self.rows_affected(Mutation::Update(id), actual)? {
            if let Some(stored) = tasks.get_mut(&id) {
                stored.name = task.name().to_string();
                stored.description = task.description().map(str::to_string);
                stored.category = task.category().map(str::to_string);
            }
        }

        Ok(())
    }

    async fn delete(&self, _handle: &mut MockHandle, id: i64) -> Result<()> {
        self.record_call("delete", &format!("id={id}"));
        self.check_error_injection()?;

        let mut tasks = self.tasks.lock();
        let actual = u64::from(tasks.contains_key(&id));
        if self.rows_affected(Mutation::Delete(id), actual)? {
            tasks.remove(&id);
        }

        Ok(())
    }
}
