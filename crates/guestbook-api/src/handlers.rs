//! REST API handlers.
//!
//! Each handler performs at most one store operation and returns JSON.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use guestbook_core::{
    CommentSubmission, DEFAULT_PAGE_LIMIT, DbInfo, NewComment, Page, ip_hash, truncate_user_agent,
};

use crate::ApiState;
use crate::client::{client_address, query_param, saturating_param};
use crate::error::ApiError;

/// Age threshold used by cleanup when `days` is not given.
pub const DEFAULT_CLEANUP_DAYS: u64 = 30;

type ApiResult<T> = Result<T, ApiError>;

/// Maintenance handle, present only on the persistent variant.
macro_rules! maintenance {
    ($state:expr) => {
        match $state.maintenance.as_ref() {
            Some(store) => store,
            None => return Err(ApiError::NotFound),
        }
    };
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health
pub async fn health(State(state): State<ApiState>) -> Response {
    match state.comments.count().await {
        Ok(count) => {
            let mut body = json!({
                "status": "ok",
                "timestamp": Utc::now(),
                "commentsCount": count,
            });
            if let Some(store) = &state.maintenance {
                let backend = store.backend_info();
                body["storage"] = json!(backend.storage);
                body["database"] = json!(backend.database);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// ── Comments ───────────────────────────────────────────────────

/// GET /api/comments
pub async fn list_comments(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let page = Page::new(
        query_param(&params, "limit", DEFAULT_PAGE_LIMIT),
        query_param(&params, "offset", 0),
    );
    let comments = state
        .comments
        .list_recent(page)
        .await
        .map_err(ApiError::store("Failed to fetch comments"))?;
    Ok(Json(comments))
}

/// POST /api/comments
pub async fn create_comment(
    State(state): State<ApiState>,
    headers: HeaderMap,
    peer: Option<Extension<ConnectInfo<SocketAddr>>>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let submission: CommentSubmission =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidPayload(e.to_string()))?;

    let mut new = NewComment::from_submission(submission);
    if state.is_persistent() {
        let peer = peer.map(|Extension(ConnectInfo(addr))| addr);
        new = new.with_ip_hash(ip_hash(&client_address(&headers, peer)));
        if let Some(ua) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
            new = new.with_user_agent(truncate_user_agent(ua));
        }
    }

    let comment = state
        .comments
        .append(new)
        .await
        .map_err(ApiError::store("Failed to save comment"))?;
    info!(id = comment.id, "comment created");

    let mut body = json!({
        "success": true,
        "id": comment.id,
        "message": "Comment added successfully",
    });
    if state.is_persistent() {
        body["comment"] = json!(comment);
    }
    Ok(Json(body))
}

/// `id` as sent by clients: a JSON integer or an integer string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommentId {
    Int(i64),
    Text(String),
}

impl CommentId {
    fn resolve(self) -> Option<i64> {
        match self {
            CommentId::Int(id) => Some(id),
            CommentId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    id: Option<CommentId>,
}

/// DELETE /api/comments
pub async fn delete_comment(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let store = maintenance!(state);
    let id = serde_json::from_slice::<DeleteRequest>(&body)
        .ok()
        .and_then(|req| req.id)
        .and_then(CommentId::resolve)
        .ok_or(ApiError::MissingId)?;

    let deleted = store
        .delete(id)
        .await
        .map_err(ApiError::store("Failed to delete comment"))?;
    info!(id, deleted, "comment delete requested");
    Ok(Json(json!({ "success": deleted > 0, "deleted": deleted })))
}

/// POST /api/comments/cleanup
pub async fn cleanup_comments(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let store = maintenance!(state);
    let days = saturating_param(&params, "days", DEFAULT_CLEANUP_DAYS);

    let deleted = store
        .cleanup_older_than(days)
        .await
        .map_err(ApiError::store("Failed to cleanup comments"))?;
    Ok(Json(json!({
        "success": true,
        "deleted": deleted,
        "message": format!("Deleted {deleted} comments older than {days} days"),
    })))
}

// ── Admin ──────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DbInfoResponse {
    #[serde(flatten)]
    info: DbInfo,
    database_name: String,
    timestamp: DateTime<Utc>,
}

/// GET /admin/db-info
pub async fn db_info(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    let store = maintenance!(state);
    let info = store
        .db_info()
        .await
        .map_err(ApiError::store("Failed to get database info"))?;
    Ok(Json(DbInfoResponse {
        info,
        database_name: store.backend_info().database,
        timestamp: Utc::now(),
    }))
}

// ── Fallback ───────────────────────────────────────────────────

/// Preflight for any `OPTIONS` request, JSON 404 for everything else.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ApiError::NotFound.into_response()
    }
}
