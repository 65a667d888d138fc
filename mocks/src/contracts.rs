//! Contract test helpers for validating trait implementations
//!
//! Provides standardized tests that any TaskStore, driven through its
//! ConnectionProvider, should pass. Every contract expects an empty store.

use crate::{assert_conflict, assert_not_found, assert_task_matches_input, TaskInputBuilder};
use task_core::{
    ConnectionProvider, Result, StatementHandle, Task, TaskInput, TaskStore, TaskValidator,
};

/// Run every store contract against an empty store
pub async fn test_store_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    test_empty_contract(provider, store).await;
    test_create_contract(provider, store).await;
    test_update_contract(provider, store).await;
    test_delete_contract(provider, store).await;
    test_list_contract(provider, store).await;
    test_health_check_contract(provider).await;
}

async fn create<P, S>(provider: &P, store: &S, input: &TaskInput) -> Result<()>
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let task = TaskValidator::validate(input)?;
    let mut handle = provider.acquire().await?;
    let outcome = store.create(&mut handle, &task).await;
    handle.finish(outcome).await
}

async fn list<P, S>(provider: &P, store: &S) -> Result<Vec<Task>>
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let mut handle = provider.acquire().await?;
    let outcome = store.get_all(&mut handle).await;
    handle.finish(outcome).await?.into_vec()
}

async fn get<P, S>(provider: &P, store: &S, id: i64) -> Result<Task>
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let mut handle = provider.acquire().await?;
    let outcome = store.get_one(&mut handle, id).await;
    handle.finish(outcome).await
}

async fn find_by_name<P, S>(provider: &P, store: &S, name: &str) -> Task
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    list(provider, store)
        .await
        .expect("List should succeed")
        .into_iter()
        .find(|task| task.name == name)
        .unwrap_or_else(|| panic!("Task {name:?} should exist"))
}

/// Test behavior on an empty table
pub async fn test_empty_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    // An empty table is reported as not found, not as an empty list
    assert_not_found(&list(provider, store).await);
    assert_not_found(&get(provider, store, 1).await);
}

/// Test task creation contract
pub async fn test_create_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let input = TaskInputBuilder::new()
        .with_name("Contract Create")
        .with_description("Description 1")
        .with_category("Category 1")
        .build();

    create(provider, store, &input)
        .await
        .expect("Create should succeed");

    let stored = find_by_name(provider, store, "Contract Create").await;
    assert_task_matches_input(&stored, &input);

    let fetched = get(provider, store, stored.id)
        .await
        .expect("Get should succeed");
    assert_eq!(fetched, stored, "Get should return the listed task");

    // Test duplicate name rejection
    assert_conflict(&create(provider, store, &input).await);
}

/// Test task update contract
pub async fn test_update_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let input = TaskInputBuilder::new().with_name("Contract Update").build();
    create(provider, store, &input)
        .await
        .expect("Create should succeed");
    let task = find_by_name(provider, store, "Contract Update").await;

    let changes = TaskInputBuilder::new()
        .with_name("Contract Updated")
        .with_category("Hobby")
        .build();
    let validated = TaskValidator::validate(&changes).expect("Changes should be valid");

    let mut handle = provider.acquire().await.expect("Acquire should succeed");
    let outcome = store.update(&mut handle, task.id, &validated).await;
    handle.finish(outcome).await.expect("Update should succeed");

    let updated = get(provider, store, task.id)
        .await
        .expect("Get should succeed");
    assert_eq!(updated.id, task.id, "ID should remain unchanged");
    assert_eq!(updated.created_at, task.created_at, "Creation time should remain unchanged");
    assert_task_matches_input(&updated, &changes);

    // Test update of non-existent task
    let mut handle = provider.acquire().await.expect("Acquire should succeed");
    let outcome = store.update(&mut handle, 99999, &validated).await;
    assert_not_found(&handle.finish(outcome).await);
}

/// Test task deletion contract
pub async fn test_delete_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let input = TaskInputBuilder::new().with_name("Contract Delete").build();
    create(provider, store, &input)
        .await
        .expect("Create should succeed");
    let task = find_by_name(provider, store, "Contract Delete").await;

    let mut handle = provider.acquire().await.expect("Acquire should succeed");
    let outcome = store.delete(&mut handle, task.id).await;
    handle.finish(outcome).await.expect("Delete should succeed");

    assert_not_found(&get(provider, store, task.id).await);

    // Deleting twice is NotFound both times, never Internal
    for _ in 0..2 {
        let mut handle = provider.acquire().await.expect("Acquire should succeed");
        let outcome = store.delete(&mut handle, task.id).await;
        assert_not_found(&handle.finish(outcome).await);
    }
}

/// Test list operations contract
pub async fn test_list_contract<P, S>(provider: &P, store: &S)
where
    P: ConnectionProvider,
    S: TaskStore<Handle = P::Handle>,
{
    let before = list(provider, store).await.map(|tasks| tasks.len()).unwrap_or(0);

    for i in 1..=3 {
        let input = TaskInputBuilder::new()
            .with_name(format!("Contract List {i}"))
            .build();
        create(provider, store, &input)
            .await
            .expect("Create should succeed");
    }

    let tasks = list(provider, store).await.expect("List should succeed");
    assert_eq!(tasks.len(), before + 3);
    crate::assert_ids_ascending(&tasks);
}

/// Test health check contract
pub async fn test_health_check_contract<P: ConnectionProvider>(provider: &P) {
    provider
        .health_check()
        .await
        .expect("Health check should succeed");
}
