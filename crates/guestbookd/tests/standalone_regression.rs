//! Standalone regression tests.
//!
//! Validates that a config is turned into a working service: the chosen
//! backend is wired up, the SQLite schema exists before the first request,
//! and data written through the API survives a restart of the SQL store.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use guestbook_api::build_router;
use guestbook_core::GuestbookConfig;
use guestbook_core::config::BackendKind;

fn sqlite_config(dir: &tempfile::TempDir) -> GuestbookConfig {
    let mut config = GuestbookConfig::default();
    config.storage.backend = BackendKind::Sqlite;
    config.storage.url = format!("sqlite://{}", dir.path().join("guestbook.db").display());
    config.storage.database_name = "guestbook-test".to_string();
    config
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_comment(router: &axum::Router, comment: &str) -> StatusCode {
    let body = format!(r#"{{"email":"a@b.com","comment":"{comment}"}}"#);
    let req = Request::builder()
        .method("POST")
        .uri("/api/comments")
        .body(Body::from(body))
        .unwrap();
    router.clone().oneshot(req).await.unwrap().status()
}

#[tokio::test]
async fn standalone_memory_backend() {
    let mut config = GuestbookConfig::default();
    config.storage.backend = BackendKind::Memory;
    config.storage.memory_capacity = 2;

    let state = guestbookd::build_state(&config).await.unwrap();
    assert!(!state.is_persistent());
    let router = build_router(state);

    for n in 0..3 {
        assert_eq!(post_comment(&router, &format!("c{n}")).await, StatusCode::OK);
    }

    let (status, list) = get_json(&router, "/api/comments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[0]["comment"], "c2");
}

#[tokio::test]
async fn standalone_sqlite_schema_ready_before_first_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);

    let router = build_router(guestbookd::build_state(&config).await.unwrap());

    let (status, info) = get_json(&router, "/admin/db-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["commentCount"], 0);
    assert_eq!(info["databaseName"], "guestbook-test");

    let (status, health) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["database"], "guestbook-test");
}

#[tokio::test]
async fn standalone_sqlite_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);

    let router = build_router(guestbookd::build_state(&config).await.unwrap());
    assert_eq!(post_comment(&router, "persisted").await, StatusCode::OK);
    drop(router);

    let router = build_router(guestbookd::build_state(&config).await.unwrap());
    let (_, list) = get_json(&router, "/api/comments").await;
    assert_eq!(list[0]["comment"], "persisted");
}

#[tokio::test]
async fn init_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);

    guestbookd::init_database(&config).await.unwrap();
    guestbookd::init_database(&config).await.unwrap();
    assert!(dir.path().join("guestbook.db").exists());
}
