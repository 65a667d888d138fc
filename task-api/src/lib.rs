//! Task HTTP API
//!
//! This crate provides the HTTP surface of the task service on top of axum.
//!
//! # Overview
//!
//! - REST routes for creating, reading, listing, updating and deleting tasks
//! - Validation before any storage access
//! - Error mapping from core errors to status codes and `{"detail": ...}` bodies
//! - Structured request logging through `tracing`
//!
//! Handlers are generic over the [`ConnectionProvider`](task_core::ConnectionProvider)
//! and [`TaskStore`](task_core::TaskStore), so the same router runs on SQLite
//! in production and on in-memory doubles in tests.
//!
//! # Usage
//!
//! ```no_run
//! use database::{ensure_schema, ConnectionManager, ConnectionSettings, SqliteTaskStore};
//! use std::sync::Arc;
//! use task_api::TaskServer;
//! use task_core::StatementHandle;
//!
//! async fn start_server() -> anyhow::Result<()> {
//!     let manager = ConnectionManager::connect(ConnectionSettings::new("sqlite://tasks.db")).await?;
//!     let mut handle = manager.acquire().await?;
//!     ensure_schema(&mut handle).await?;
//!     handle.release().await?;
//!
//!     let server = TaskServer::new(Arc::new(manager), Arc::new(SqliteTaskStore::new()));
//!     server.serve("127.0.0.1:8000", async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await
//! }
//! ```

pub mod error;
pub mod handler;
pub mod request_logger;
pub mod serialization;
pub mod server;

// Re-export key types for easier usage
pub use error::ApiError;
pub use handler::TaskHandler;
pub use serialization::*;
pub use server::TaskServer;

// Re-export core types for external consumers
pub use task_core::{ConnectionProvider, StatementHandle, Task, TaskInput, TaskStore};
