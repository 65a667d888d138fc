//! Task HTTP Server
//!
//! Axum router for the `/tasks/` resource plus a health endpoint.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    error::ApiError,
    handler::TaskHandler,
    serialization::{
        DetailResponse, HealthResponse, TaskListResponse, TaskResponse, TASK_CREATED, TASK_UPDATED,
    },
};
use ::task_core::{ConnectionProvider, TaskInput, TaskStore};

/// HTTP server exposing task CRUD over a connection provider and a store
pub struct TaskServer<P, S> {
    handler: TaskHandler<P, S>,
}

impl<P, S> TaskServer<P, S>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    pub fn new(connections: Arc<P>, store: Arc<S>) -> Self {
        Self {
            handler: TaskHandler::new(connections, store),
        }
    }

    /// Bind `addr` and serve until `shutdown` resolves
    pub async fn serve<F>(self, addr: &str, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address '{addr}': {e}"))?;

        let listener = TcpListener::bind(socket_addr).await?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting task server on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Task server stopped");
        Ok(())
    }

    /// Create the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/tasks/",
                get(list_tasks_handler::<P, S>).post(create_task_handler::<P, S>),
            )
            .route(
                "/tasks",
                get(list_tasks_handler::<P, S>).post(create_task_handler::<P, S>),
            )
            .route(
                "/tasks/:id",
                get(get_task_handler::<P, S>)
                    .put(update_task_handler::<P, S>)
                    .delete(delete_task_handler::<P, S>),
            )
            .route("/health", get(health_handler::<P, S>))
            .fallback(not_found_handler)
            .layer(middleware::from_fn(crate::request_logger::request_logging_middleware))
            .with_state(self.handler.clone())
    }
}

type AppState<P, S> = State<TaskHandler<P, S>>;

async fn create_task_handler<P, S>(
    State(state): AppState<P, S>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DetailResponse>), ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    let Json(input) = payload?;
    state.create_task(input).await?;

    Ok((StatusCode::CREATED, Json(DetailResponse::new(TASK_CREATED))))
}

async fn get_task_handler<P, S>(
    State(state): AppState<P, S>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    let Path(id) = id?;
    let task = state.get_task(id).await?;

    Ok(Json(TaskResponse::new(task)))
}

async fn list_tasks_handler<P, S>(
    State(state): AppState<P, S>,
) -> Result<Json<TaskListResponse>, ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    let tasks = state.list_tasks().await?;

    Ok(Json(TaskListResponse::new(tasks)))
}

async fn update_task_handler<P, S>(
    State(state): AppState<P, S>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> Result<Json<DetailResponse>, ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    let Path(id) = id?;
    let Json(input) = payload?;
    state.update_task(id, input).await?;

    Ok(Json(DetailResponse::new(TASK_UPDATED)))
}

async fn delete_task_handler<P, S>(
    State(state): AppState<P, S>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    let Path(id) = id?;
    state.delete_task(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
async fn health_handler<P, S>(
    State(state): AppState<P, S>,
) -> Result<Json<HealthResponse>, ApiError>
where
    P: ConnectionProvider + 'static,
    S: TaskStore<Handle = P::Handle> + 'static,
{
    state.health_check().await?;

    Ok(Json(HealthResponse::ok()))
}

async fn not_found_handler() -> (StatusCode, Json<DetailResponse>) {
    (StatusCode::NOT_FOUND, Json(DetailResponse::new("Not Found")))
}
