//! guestbook-store — comment storage backends.
//!
//! Two backends implement [`CommentStore`]:
//!
//! - [`MemoryStore`]: a process-local, newest-first list capped at a fixed
//!   number of entries. Reset whenever the process restarts.
//! - [`SqlStore`]: a SQLite `comments` table reached through sqlx. It also
//!   implements [`MaintenanceStore`] for deletion, age-based cleanup, and
//!   administrative inspection.
//!
//! Both traits hand out boxed futures so they stay object-safe and can be
//! shared as `Arc<dyn CommentStore>` across axum handlers.

pub mod error;
pub mod memory;
pub mod schema;
pub mod sql;

use std::future::Future;
use std::pin::Pin;

use guestbook_core::{BackendInfo, Comment, DbInfo, NewComment, Page};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sql::SqlStore;

/// Boxed future alias for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Append and read comments.
pub trait CommentStore: Send + Sync {
    /// Store a new comment and return it with its assigned id and timestamp.
    fn append(&self, comment: NewComment) -> StoreFuture<'_, Comment>;

    /// Comments newest first, windowed by `page`.
    fn list_recent(&self, page: Page) -> StoreFuture<'_, Vec<Comment>>;

    /// Look up a single comment by id.
    fn get(&self, id: i64) -> StoreFuture<'_, Option<Comment>>;

    /// Total number of retained comments.
    fn count(&self) -> StoreFuture<'_, u64>;
}

/// Mutating and inspection operations only the persistent backend offers.
pub trait MaintenanceStore: Send + Sync {
    /// Delete one comment. Returns the number of rows removed (0 or 1).
    fn delete(&self, id: i64) -> StoreFuture<'_, u64>;

    /// Delete every comment created at or before `now - days`.
    fn cleanup_older_than(&self, days: u64) -> StoreFuture<'_, u64>;

    fn db_info(&self) -> StoreFuture<'_, DbInfo>;

    fn backend_info(&self) -> BackendInfo;
}
