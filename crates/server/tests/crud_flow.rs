use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use service::errors::ServiceError;
use service::store::JsonFileStore;
use service::{DocumentStore, StoredDocument};
use tower::ServiceExt;

use server::{routes, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn app_with(store: Arc<dyn DocumentStore>, prefix: &str) -> Router {
    routes::build_router(AppState::new(store, "resource-api-test"), cors(), prefix)
}

fn app() -> Router {
    app_with(JsonFileStore::in_memory(), "")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Store whose every operation fails, standing in for an unreachable database.
struct DownStore;

#[async_trait]
impl DocumentStore for DownStore {
    fn kind(&self) -> &'static str { "down" }
    async fn insert(&self, _: &str, _: Map<String, Value>) -> Result<StoredDocument, ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
    async fn find_all(&self, _: &str) -> Result<Vec<StoredDocument>, ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
    async fn find_by_id(&self, _: &str, _: &str) -> Result<Option<StoredDocument>, ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
    async fn replace(&self, _: &str, _: &str, _: Map<String, Value>) -> Result<bool, ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
    async fn delete(&self, _: &str, _: &str) -> Result<bool, ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
    async fn ping(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Store("connection refused".into()))
    }
}

#[tokio::test]
async fn task_lifecycle() -> anyhow::Result<()> {
    let app = app();

    let (status, created) = send(&app, "POST", "/tasks", Some(json!({"title": "Buy milk"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id is a string").to_string();
    assert_eq!(created, json!({"id": id, "title": "Buy milk", "completed": false}));

    let (status, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([{"id": id, "title": "Buy milk", "completed": false}]));

    let (status, updated) = send(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"completed": true}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"id": id, "title": "Buy milk", "completed": true}));

    let (status, fetched) = send(&app, "GET", &format!("/tasks/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, deleted) = send(&app, "DELETE", &format!("/tasks/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"message": "Task deleted successfully"}));

    let (_, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(listed, json!([]));

    let (status, body) = send(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"completed": false}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
    let (status, _) = send(&app, "DELETE", &format!("/tasks/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/tasks/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_title_is_rejected_without_a_write() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "POST", "/tasks", Some(json!({"title": "  "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error creating task");
    assert_eq!(body["fields"][0]["field"], "title");
    assert!(body["error"].as_str().unwrap_or_default().contains("title"));

    let (status, _) = send(&app, "POST", "/tasks", Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_client_error() -> anyhow::Result<()> {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["message"], "Error creating task");

    // No content-type at all reads as an empty body.
    let req = Request::builder().method("POST").uri("/tasks").body(Body::from("{\"title\": \"x\"}"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_id_changes_nothing() -> anyhow::Result<()> {
    let app = app();
    send(&app, "POST", "/tasks", Some(json!({"title": "one"}))).await?;
    let (status, _) = send(&app, "PUT", "/tasks/does-not-exist", Some(json!({"title": "x"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["title"], "one");
    Ok(())
}

#[tokio::test]
async fn unknown_id_wins_over_body_problems_on_update() -> anyhow::Result<()> {
    let app = app();
    for body in [json!({"id": "other"}), json!([1, 2])] {
        let (status, resp) = send(&app, "PUT", "/tasks/nope", Some(body)).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp, json!({"message": "Task not found"}));
    }
    Ok(())
}

#[tokio::test]
async fn unreadable_stored_document_is_a_server_error() -> anyhow::Result<()> {
    let store: Arc<dyn DocumentStore> = JsonFileStore::in_memory();
    let junk = json!({"completed": "maybe"}).as_object().cloned().unwrap_or_default();
    let doc = store.insert("tasks", junk).await?;
    let app = app_with(store, "");

    let (status, body) = send(&app, "GET", &format!("/tasks/{}", doc.id), None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Error fetching task"}));

    let (status, body) = send(&app, "PUT", &format!("/tasks/{}", doc.id), Some(json!({"title": "x"}))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Error updating task"}));
    Ok(())
}

#[tokio::test]
async fn invalid_update_is_all_or_nothing() -> anyhow::Result<()> {
    let app = app();
    let (_, created) = send(&app, "POST", "/tasks", Some(json!({"title": "keep me"}))).await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"completed": true, "title": ""}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error updating task");

    let (_, fetched) = send(&app, "GET", &format!("/tasks/{id}"), None).await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn unknown_fields_round_trip() -> anyhow::Result<()> {
    let app = app();
    let (_, created) = send(&app, "POST", "/tasks", Some(json!({"title": "tagged", "tags": ["home"]}))).await?;
    let (_, listed) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(listed[0]["tags"], json!(["home"]));
    assert_eq!(listed[0], created);
    Ok(())
}

#[tokio::test]
async fn bookings_share_the_contract() -> anyhow::Result<()> {
    let app = app_with(JsonFileStore::in_memory(), "/api");

    let (status, body) = send(&app, "POST", "/api/bookings", Some(json!({"destination": "Lisbon"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error creating booking");
    assert_eq!(body["fields"].as_array().map(Vec::len), Some(3));

    let (status, created) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "destination": "Lisbon",
            "traveler_name": "Sam",
            "start_date": "2025-09-10",
            "end_date": "2025-09-14",
            "num_travelers": 2
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["num_travelers"], 2);
    assert!(created["created_at"].is_string());
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, deleted) = send(&app, "DELETE", &format!("/api/bookings/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Booking deleted successfully");
    Ok(())
}

#[tokio::test]
async fn store_failures_surface_as_500_with_generic_message() -> anyhow::Result<()> {
    let app = app_with(Arc::new(DownStore), "");

    let (status, body) = send(&app, "GET", "/tasks", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Error fetching tasks"}));

    let (status, body) = send(&app, "DELETE", "/tasks/abc", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error deleting task");

    // Validation runs before the store is touched.
    let (status, _) = send(&app, "POST", "/tasks", Some(json!({"title": ""}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn health_reflects_store_reachability() -> anyhow::Result<()> {
    let (status, body) = send(&app(), "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "resource-api-test");

    let (status, body) = send(&app_with(Arc::new(DownStore), ""), "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "unavailable");
    Ok(())
}
