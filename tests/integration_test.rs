use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use word_recite_backend::db::config::DbConfig;
use word_recite_backend::review::SchedulePolicy;

mod common;

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_root() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live_and_info() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/health/info")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "word-recite-backend");
}

#[tokio::test]
async fn test_404_not_found() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/nonexistent/path")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_answer_creates_and_advances_record() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/users/1/reviews", json!({ "wordId": 5, "outcome": "correct" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["level"], 1);
    assert_eq!(body["data"]["totalCorrect"], 1);
    assert_eq!(body["data"]["wordId"], 5);

    let (status, body) = send(
        &app,
        post_json("/api/users/1/reviews", json!({ "wordId": 5, "outcome": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 0);
    assert_eq!(body["data"]["totalWrong"], 1);
    assert_eq!(body["data"]["totalCorrect"], 1);
}

#[tokio::test]
async fn test_answer_rejects_unknown_outcome() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/users/1/reviews", json!({ "wordId": 5, "outcome": "skipped" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, get("/api/users/1/records/5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, post_json("/api/users/1/reviews", json!({ "wordId": "x" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_non_numeric_user_id_is_validation_error() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/api/users/abc/records/completed-count")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_conflict() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, post_json("/api/users/1/records", json!({ "wordId": 5 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["level"], 0);

    let (status, body) = send(&app, post_json("/api/users/1/records", json!({ "wordId": 5 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_batch_due_count_and_delete() {
    let (app, _db) = common::create_test_app().await;

    for word_id in [1, 2, 3] {
        let (status, _) = send(
            &app,
            post_json("/api/users/42/records", json!({ "wordId": word_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        post_json("/api/users/42/records/batch", json!({ "wordIds": [1, 3, 9] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_object().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.contains_key("1"));
    assert!(data.contains_key("3"));

    let (status, body) = send(&app, get("/api/users/42/records/due?asOf=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, get("/api/users/42/records/completed-count")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);

    let (status, body) = send(&app, delete("/api/users/42/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 3);

    let (status, _) = send(&app, get("/api/users/42/records/2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, delete("/api/users/42/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 0);
}

#[tokio::test]
async fn test_batch_with_empty_ids() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/users/42/records/batch", json!({ "wordIds": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_unavailable_database() {
    let dir = tempfile::TempDir::new().unwrap();
    // A directory cannot be opened as a database file.
    let mut config = DbConfig::for_path(dir.path());
    config.url = format!("sqlite:{}", dir.path().display());
    let app = word_recite_backend::create_app(config, SchedulePolicy::default()).await;

    let (status, body) = send(&app, get("/api/users/1/records/completed-count")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
