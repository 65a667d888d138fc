use serde_json::{json, Value};
use task_server::{initialize_app, startup_exit_code, Config, EXIT_STORAGE_UNAVAILABLE};
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::oneshot};

fn file_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.url = format!(
        "sqlite://{}",
        dir.path().join("data").join("tasks.db").display()
    );
    config
}

#[tokio::test]
async fn test_initialize_app_creates_directory_and_schema() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    let app = initialize_app(&config).await.unwrap();
    assert!(dir.path().join("data").join("tasks.db").exists());
    assert!(app.connections.is_connected().await);

    app.connections.close().await.unwrap();
}

#[tokio::test]
async fn test_unopenable_database_maps_to_storage_exit_code() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    // A directory cannot be opened as a database file
    config.database.url = format!("sqlite://{}", dir.path().display());

    let error = initialize_app(&config).await.err().unwrap();
    assert_eq!(startup_exit_code(&error), EXIT_STORAGE_UNAVAILABLE);
}

#[tokio::test]
async fn test_served_app_round_trip_and_persistence() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    let app = initialize_app(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown, stopped) = oneshot::channel::<()>();

    let connections = app.connections.clone();
    let serving = tokio::spawn(app.server.serve_with_listener(listener, async {
        let _ = stopped.await;
    }));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/tasks/"))
        .json(&json!({"name": "Task 1", "description": "Description 1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({"status": "ok"}));

    shutdown.send(()).unwrap();
    serving.await.unwrap().unwrap();
    connections.close().await.unwrap();

    // A second start on the same file sees the committed row
    let app = initialize_app(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(app.server.serve_with_listener(listener, async {
        let _ = stopped.await;
    }));

    let body: Value = client
        .get(format!("{base}/tasks/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["name"], "Task 1");
    assert_eq!(body["data"]["description"], "Description 1");

    shutdown.send(()).unwrap();
    serving.await.unwrap().unwrap();
}
