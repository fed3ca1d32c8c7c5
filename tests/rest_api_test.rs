//! Integration tests for the task REST API.
//! Spins up a real server on a free port and drives it over HTTP with the
//! same client the terminal UI uses, plus raw requests for the error paths.

use std::sync::Arc;

use serde_json::{json, Value};
use taskd::{client::ApiClient, config::ServerConfig, storage::Storage, AppContext};

fn get_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a server on a random port and return its API base URL.
/// The TempDir is returned so the data directory outlives the test.
async fn start_test_server() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let port = get_free_port();

    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
        None,
    ));
    let storage = Arc::new(Storage::new(&config.data_dir).await.unwrap());
    let ctx = Arc::new(AppContext {
        config,
        storage,
        started_at: std::time::Instant::now(),
    });

    tokio::spawn(async move {
        taskd::rest::start_rest_server(ctx).await.ok();
    });

    // Give the server a moment to bind
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}/api"), dir)
}

#[tokio::test]
async fn full_task_lifecycle() {
    let (base, _dir) = start_test_server().await;
    let http = reqwest::Client::new();

    // Create — 201 with completed=false and a non-empty id.
    let resp = http
        .post(format!("{base}/tasks"))
        .json(&json!({ "task": "buy milk" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["task"], "buy milk");
    assert_eq!(created["completed"], false);
    assert!(created["createdAt"].as_str().is_some());
    assert!(created["updatedAt"].as_str().is_some());

    // Update — 200 with completed=true.
    let resp = http
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["completed"], true);

    // Delete — 200 with the confirmation message.
    let resp = http
        .delete(format!("{base}/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Task deleted");

    // List — the id is gone.
    let resp = http.get(format!("{base}/tasks")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert!(tasks.iter().all(|t| t["id"] != json!(id)));
}

#[tokio::test]
async fn client_round_trip() {
    let (base, _dir) = start_test_server().await;
    let client = ApiClient::new(&base).unwrap();

    let created = client.create("walk the dog").await.unwrap();
    assert!(!created.completed);

    let toggled = client.set_completed(&created.id, true).await.unwrap();
    assert!(toggled.completed);

    // Toggling to the same state twice is idempotent.
    let again = client.set_completed(&created.id, true).await.unwrap();
    assert!(again.completed);

    client.delete(&created.id).await.unwrap();
    let tasks = client.list().await.unwrap();
    assert!(tasks.iter().all(|t| t.id != created.id));
}

#[tokio::test]
async fn create_rejects_blank_text() {
    let (base, _dir) = start_test_server().await;
    let http = reqwest::Client::new();

    for text in ["", "   "] {
        let resp = http
            .post(format!("{base}/tasks"))
            .json(&json!({ "task": text }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().is_some());
    }

    let resp = http.get(format!("{base}/tasks")).send().await.unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (base, _dir) = start_test_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .put(format!("{base}/tasks/00000000-0000-0000-0000-000000000000"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn update_malformed_id_is_bad_request() {
    let (base, _dir) = start_test_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .put(format!("{base}/tasks/not-a-uuid"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("invalid task id"));
}

#[tokio::test]
async fn delete_unknown_id_succeeds() {
    let (base, _dir) = start_test_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .delete(format!("{base}/tasks/00000000-0000-0000-0000-000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (base, _dir) = start_test_server().await;
    let client = ApiClient::new(&base).unwrap();

    let first = client.create("older").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = client.create("newer").await.unwrap();

    let tasks = client.list().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, second.id);
    assert_eq!(tasks[1].id, first.id);
}

#[tokio::test]
async fn health_reports_ok() {
    let (base, _dir) = start_test_server().await;
    let client = ApiClient::new(&base).unwrap();

    client.create("one").await.unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tasks"], 1);
    assert!(health["version"].as_str().is_some());
}
