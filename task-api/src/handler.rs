//! Task Handler
//!
//! Runs each request operation against the store: validate first, then
//! acquire a handle, run exactly one store call, release on every path.

use ::task_core::error::Result;
use ::task_core::{
    ConnectionProvider, StatementHandle, Task, TaskInput, TaskList, TaskStore, TaskValidator,
};
use std::sync::Arc;

/// Bridges HTTP requests with a ConnectionProvider and a TaskStore
pub struct TaskHandler<P, S> {
    connections: Arc<P>,
    store: Arc<S>,
}

impl<P, S> Clone for TaskHandler<P, S> {
    fn clone(&self) -> Self {
        Self {
            connections: self.connections.clone(),
            store: self.store.clone(),
        }
    }
}

impl<P, S> TaskHandler<P, S> {
    /// Create new task handler
    pub fn new(connections: Arc<P>, store: Arc<S>) -> Self {
        Self { connections, store }
    }

    /// Get a clone of the connection provider Arc
    pub fn connections(&self) -> Arc<P> {
        self.connections.clone()
    }

    /// Get a clone of the store Arc
    pub fn store(&self) -> Arc<S> {
        self.store.clone()
    }
}

impl<P, S> TaskHandler<P, S>
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    pub async fn create_task(&self, input: TaskInput) -> Result<()> {
        let task = TaskValidator::validate(&input)?;

        let mut handle = self.connections.acquire().await?;
        let outcome = self.store.create(&mut handle, &task).await;
        handle.finish(outcome).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task> {
        let mut handle = self.connections.acquire().await?;
        let outcome = self.store.get_one(&mut handle, id).await;
        handle.finish(outcome).await
    }

    /// List every task; an empty table is reported as not found
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut handle = self.connections.acquire().await?;
        let outcome = self
            .store
            .get_all(&mut handle)
            .await
            .and_then(TaskList::into_vec);
        handle.finish(outcome).await
    }

    pub async fn update_task(&self, id: i64, input: TaskInput) -> Result<()> {
        let task = TaskValidator::validate(&input)?;

        let mut handle = self.connections.acquire().await?;
        let outcome = self.store.update(&mut handle, id, &task).await;
        handle.finish(outcome).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<()> {
        let mut handle = self.connections.acquire().await?;
        let outcome = self.store.delete(&mut handle, id).await;
        handle.finish(outcome).await
    }

    pub async fn health_check(&self) -> Result<()> {
        self.connections.health_check().await
    }
}
