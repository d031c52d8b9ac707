//! Shared types used across guestbook crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color assigned to a comment when the submitter leaves it out.
pub const DEFAULT_COLOR: &str = "black";

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// A stored guestbook comment.
///
/// `id` and `timestamp` are always assigned by the backend. The
/// fingerprint fields are only populated by the persistent backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub email: String,
    pub comment: String,
    pub color: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// POST body accepted by `/api/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentSubmission {
    pub email: String,
    pub comment: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl CommentSubmission {
    /// The submitted color, or [`DEFAULT_COLOR`] when absent or blank.
    pub fn color_or_default(&self) -> &str {
        match self.color.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_COLOR,
        }
    }
}

/// A comment resolved server-side and ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub email: String,
    pub comment: String,
    pub color: String,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
}

impl NewComment {
    /// Build from a submission with no client fingerprint attached.
    pub fn from_submission(submission: CommentSubmission) -> Self {
        let color = submission.color_or_default().to_string();
        Self {
            email: submission.email,
            comment: submission.comment,
            color,
            ip_hash: None,
            user_agent: None,
        }
    }

    pub fn with_ip_hash(mut self, ip_hash: impl Into<String>) -> Self {
        self.ip_hash = Some(ip_hash.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Limit/offset window over the newest-first comment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Administrative snapshot of the persistent backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInfo {
    pub tables: Vec<String>,
    pub comment_count: u64,
    pub last_comment_time: Option<DateTime<Utc>>,
}

/// Identifies a backend in health and admin responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub storage: &'static str,
    pub database: String,
}
