//! SqlStore — SQLite-backed comment persistence.
//!
//! Rows are written with `INSERT … RETURNING`, so the comment handed back
//! to the caller comes from the same statement that created it rather than
//! a second lookup by id. `created_at` is stored as Unix milliseconds.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use guestbook_core::{BackendInfo, Comment, DbInfo, NewComment, Page};

use crate::error::{StoreError, StoreResult};
use crate::schema;
use crate::{CommentStore, MaintenanceStore, StoreFuture};

/// Storage identifier reported by health and admin endpoints.
pub const STORAGE_NAME: &str = "sqlite";

const MILLIS_PER_DAY: i64 = 86_400_000;

const COMMENT_COLUMNS: &str = "id, email, comment, color, created_at, ip_hash, user_agent";

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    email: String,
    comment: String,
    color: String,
    created_at: i64,
    ip_hash: Option<String>,
    user_agent: Option<String>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> StoreResult<Self> {
        let timestamp = millis_to_datetime(row.created_at)?;
        Ok(Comment {
            id: row.id,
            email: row.email,
            comment: row.comment,
            color: row.color,
            timestamp,
            ip_hash: row.ip_hash,
            user_agent: row.user_agent,
        })
    }
}

fn millis_to_datetime(millis: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::InvalidRow(format!("created_at out of range: {millis}")))
}

/// Cutoff for age-based cleanup, in Unix milliseconds.
fn cleanup_cutoff(now: DateTime<Utc>, days: u64) -> i64 {
    let days = i64::try_from(days).unwrap_or(i64::MAX);
    now.timestamp_millis()
        .saturating_sub(days.saturating_mul(MILLIS_PER_DAY))
}

/// Comment store backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
    database_name: String,
}

impl SqlStore {
    /// Open (or create) the database at `url`.
    ///
    /// The schema is not touched here; call [`SqlStore::ensure_schema`]
    /// once at startup.
    pub async fn connect(
        url: &str,
        database_name: &str,
        max_connections: u32,
    ) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(map_err!(Connect))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(map_err!(Connect))?;
        info!(%url, database = database_name, "sql store opened");
        Ok(Self {
            pool,
            database_name: database_name.to_string(),
        })
    }

    /// Create a private in-memory database with the schema in place (for testing).
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_err!(Connect))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(map_err!(Connect))?;
        let store = Self {
            pool,
            database_name: "memory".to_string(),
        };
        store.ensure_schema().await?;
        debug!("in-memory sql store opened");
        Ok(store)
    }

    /// Create the comment table and its indexes if they don't exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_err!(Schema))?;
        }
        debug!(table = schema::COMMENTS_TABLE, "schema ensured");
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert(&self, new: NewComment) -> StoreResult<Comment> {
        let created_at = Utc::now().timestamp_millis();
        let sql = format!(
            "INSERT INTO comments (email, comment, color, created_at, ip_hash, user_agent)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COMMENT_COLUMNS}"
        );
        let row: CommentRow = sqlx::query_as(&sql)
            .bind(&new.email)
            .bind(&new.comment)
            .bind(&new.color)
            .bind(created_at)
            .bind(&new.ip_hash)
            .bind(&new.user_agent)
            .fetch_one(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        debug!(id = row.id, "comment inserted");
        row.try_into()
    }

    async fn page(&self, page: Page) -> StoreResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        );
        let rows: Vec<CommentRow> = sqlx::query_as(&sql)
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?");
        let row: Option<CommentRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        row.map(Comment::try_from).transpose()
    }

    async fn total(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        Ok(count.max(0) as u64)
    }

    async fn remove(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        let deleted = result.rows_affected();
        debug!(id, deleted, "comment delete");
        Ok(deleted)
    }

    async fn remove_older_than(&self, days: u64) -> StoreResult<u64> {
        let cutoff = cleanup_cutoff(Utc::now(), days);
        let result = sqlx::query("DELETE FROM comments WHERE created_at <= ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        let deleted = result.rows_affected();
        info!(days, cutoff, deleted, "comment cleanup");
        Ok(deleted)
    }

    async fn inspect(&self) -> StoreResult<DbInfo> {
        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(map_err!(Query))?;
        let comment_count = self.total().await?;
        let last: Option<i64> = sqlx::query_scalar("SELECT MAX(created_at) FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err!(Query))?;
        let last_comment_time = last.map(millis_to_datetime).transpose()?;
        Ok(DbInfo {
            tables,
            comment_count,
            last_comment_time,
        })
    }
}

impl CommentStore for SqlStore {
    fn append(&self, comment: NewComment) -> StoreFuture<'_, Comment> {
        Box::pin(self.insert(comment))
    }

    fn list_recent(&self, page: Page) -> StoreFuture<'_, Vec<Comment>> {
        Box::pin(self.page(page))
    }

    fn get(&self, id: i64) -> StoreFuture<'_, Option<Comment>> {
        Box::pin(self.find(id))
    }

    fn count(&self) -> StoreFuture<'_, u64> {
        Box::pin(self.total())
    }
}

impl MaintenanceStore for SqlStore {
    fn delete(&self, id: i64) -> StoreFuture<'_, u64> {
        Box::pin(self.remove(id))
    }

    fn cleanup_older_than(&self, days: u64) -> StoreFuture<'_, u64> {
        Box::pin(self.remove_older_than(days))
    }

    fn db_info(&self) -> StoreFuture<'_, DbInfo> {
        Box::pin(self.inspect())
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            storage: STORAGE_NAME,
            database: self.database_name.clone(),
        }
    }
}
