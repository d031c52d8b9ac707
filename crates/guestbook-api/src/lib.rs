//! guestbook-api — REST API for the guestbook.
//!
//! Provides axum route handlers over a [`CommentStore`]. The persistent
//! variant additionally mounts deletion, cleanup, and inspection routes.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/health` | Status, time, comment count |
//! | GET | `/api/comments` | List comments, newest first (`limit`, `offset`) |
//! | POST | `/api/comments` | Create a comment |
//! | DELETE | `/api/comments` | Delete a comment by id (persistent only) |
//! | POST | `/api/comments/cleanup` | Delete comments older than `days` (persistent only) |
//! | GET | `/admin/db-info` | Table names, count, latest comment (persistent only) |
//!
//! Every response carries permissive CORS headers. `OPTIONS` on any path
//! answers the preflight with an empty 200; anything else unmatched is a
//! JSON 404.

pub mod client;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::routing::{get, post};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use guestbook_store::{CommentStore, MaintenanceStore, MemoryStore, SqlStore};

pub use error::ApiError;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub comments: Arc<dyn CommentStore>,
    /// Present only for the persistent backend.
    pub maintenance: Option<Arc<dyn MaintenanceStore>>,
}

impl ApiState {
    /// State for the in-memory variant.
    pub fn ephemeral(store: MemoryStore) -> Self {
        Self {
            comments: Arc::new(store),
            maintenance: None,
        }
    }

    /// State for the SQL-backed variant.
    pub fn persistent(store: SqlStore) -> Self {
        let store = Arc::new(store);
        Self {
            comments: store.clone(),
            maintenance: Some(store),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.maintenance.is_some()
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let comments = if state.is_persistent() {
        get(handlers::list_comments)
            .post(handlers::create_comment)
            .delete(handlers::delete_comment)
    } else {
        get(handlers::list_comments).post(handlers::create_comment)
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/comments", comments);

    if state.is_persistent() {
        router = router
            .route("/api/comments/cleanup", post(handlers::cleanup_comments))
            .route("/admin/db-info", get(handlers::db_info));
    }

    router
        .fallback(handlers::fallback)
        .method_not_allowed_fallback(handlers::fallback)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}
