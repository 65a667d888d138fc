//! End-to-end tests of the HTTP surface over a real SQLite database

mod support;

use database::{ensure_schema, ConnectionManager, ConnectionSettings, SqliteTaskStore};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use support::TestServer;
use task_core::StatementHandle;

async fn start() -> TestServer {
    let manager = ConnectionManager::connect(ConnectionSettings::new(":memory:"))
        .await
        .unwrap();

    let mut handle = manager.acquire().await.unwrap();
    ensure_schema(&mut handle).await.unwrap();
    handle.release().await.unwrap();

    TestServer::start(Arc::new(manager), Arc::new(SqliteTaskStore::new())).await
}

async fn create(server: &TestServer, body: Value) -> (StatusCode, Value) {
    let response = server
        .client
        .post(server.url("/tasks/"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = server.client.get(server.url(path)).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let server = start().await;

    let (status, body) = create(
        &server,
        json!({"name": "Task 1", "description": "Description 1", "category": "Category 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"detail": "Task created successfully"}));

    let (status, body) = get(&server, "/tasks/").await;
    assert_eq!(status, StatusCode::OK);
    let listed = &body["data"][0];
    let id = listed["id"].as_i64().unwrap();
    assert!(id > 0);

    let (status, body) = get(&server, &format!("/tasks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let task = &body["data"];
    assert_eq!(task["name"], "Task 1");
    assert_eq!(task["description"], "Description 1");
    assert_eq!(task["category"], "Category 1");
    assert!(task["created_at"].as_str().unwrap().contains('T'));
    assert_eq!(task, listed);
}

#[tokio::test]
async fn test_optional_fields_may_be_omitted() {
    let server = start().await;

    let (status, _) = create(&server, json!({"name": "Task 1"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = get(&server, "/tasks/").await;
    assert!(body["data"][0]["description"].is_null());
    assert!(body["data"][0]["category"].is_null());
}

#[tokio::test]
async fn test_taskname_is_accepted_as_name() {
    let server = start().await;

    let (status, _) = create(&server, json!({"taskname": "Legacy client"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = get(&server, "/tasks/").await;
    assert_eq!(body["data"][0]["name"], "Legacy client");
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let server = start().await;

    create(&server, json!({"name": "Task 1"})).await;
    let (status, body) = create(&server, json!({"name": "Task 1"})).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"detail": "Task with this name already exists"}));
}

#[tokio::test]
async fn test_validation_failures_are_422() {
    let server = start().await;

    let (status, body) = create(&server, json!({"name": "ab"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "name");

    let (status, body) = create(&server, json!({"name": "abc!"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "name");

    let (status, body) = create(&server, json!({"name": "Task 1", "category": "x".repeat(101)})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "category");

    // Nothing reached storage
    let (status, _) = get(&server, "/tasks/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_injection_attempt_is_rejected_and_harmless() {
    let server = start().await;

    create(&server, json!({"name": "Task 1"})).await;
    let (status, _) = create(&server, json!({"name": "x'); DROP TABLE tasks; --"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = get(&server, "/tasks/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_requests_are_422() {
    let server = start().await;

    // Missing required field
    let (status, body) = create(&server, json!({"description": "no name"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    // Wrong type
    let (status, _) = create(&server, json!({"name": 42})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Not JSON at all
    let response = server
        .client
        .post(server.url("/tasks/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Non-integer path ID
    let (status, body) = get(&server, "/tasks/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_missing_task_is_404() {
    let server = start().await;

    let (status, body) = get(&server, "/tasks/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Task with ID 999 not found"}));
}

#[tokio::test]
async fn test_empty_list_is_404() {
    let server = start().await;

    let (status, body) = get(&server, "/tasks/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "No tasks yet"}));
}

#[tokio::test]
async fn test_update() {
    let server = start().await;

    create(&server, json!({"name": "Task 1", "description": "Old"})).await;
    create(&server, json!({"name": "Task 2"})).await;
    let (_, body) = get(&server, "/tasks/").await;
    let first = body["data"][0].clone();
    let id = first["id"].as_i64().unwrap();

    let response = server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({"name": "Task 1 renamed", "category": "Hobby"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"detail": "Task updated successfully"})
    );

    let (_, body) = get(&server, &format!("/tasks/{id}")).await;
    assert_eq!(body["data"]["name"], "Task 1 renamed");
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["category"], "Hobby");
    assert_eq!(body["data"]["created_at"], first["created_at"]);

    // Taking another task's name
    let response = server
        .client
        .put(server.url(&format!("/tasks/{id}")))
        .json(&json!({"name": "Task 2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Unknown ID
    let response = server
        .client
        .put(server.url("/tasks/999"))
        .json(&json!({"name": "Task 3"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
    let server = start().await;

    create(&server, json!({"name": "Task 1"})).await;
    let (_, body) = get(&server, "/tasks/").await;
    let id = body["data"][0]["id"].as_i64().unwrap();

    let response = server
        .client
        .delete(server.url(&format!("/tasks/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    // Deleting again is NotFound, never an internal error
    for _ in 0..2 {
        let response = server
            .client
            .delete(server.url(&format!("/tasks/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let server = start().await;

    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = get(&server, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not Found"}));
}

#[tokio::test]
async fn test_concurrent_creates() {
    let server = Arc::new(start().await);

    let requests = (0..25).map(|i| {
        let server = server.clone();
        async move { create(&server, json!({"name": format!("Task {i}")})).await.0 }
    });
    let statuses = futures_util::future::join_all(requests).await;

    assert!(statuses.iter().all(|status| *status == StatusCode::CREATED));
    let (_, body) = get(&server, "/tasks/").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 25);
}
