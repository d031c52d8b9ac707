//! In-memory comment list.
//!
//! Comments live in a `VecDeque` ordered newest first. After every insert
//! the list is truncated to its capacity, so the oldest entries fall off
//! the back. Nothing survives a restart.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use guestbook_core::{Comment, NewComment, Page};

use crate::error::{StoreError, StoreResult};
use crate::{CommentStore, StoreFuture};

/// Number of comments retained by [`MemoryStore::default`].
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Default)]
struct Inner {
    comments: VecDeque<Comment>,
    last_id: i64,
}

/// Ephemeral, capacity-bounded comment store.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemoryStore {
    /// Create an empty store that keeps at most `capacity` comments.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every stored comment.
    pub fn reset(&self) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.comments.clear();
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    fn insert(&self, new: NewComment, now: DateTime<Utc>) -> StoreResult<Comment> {
        let mut inner = self.lock()?;

        // Millisecond ids, bumped past the previous one on collisions.
        let id = now.timestamp_millis().max(inner.last_id + 1);
        inner.last_id = id;

        let comment = Comment {
            id,
            email: new.email,
            comment: new.comment,
            color: new.color,
            timestamp: now,
            ip_hash: new.ip_hash,
            user_agent: new.user_agent,
        };

        inner.comments.push_front(comment.clone());
        inner.comments.truncate(self.capacity);
        debug!(id, retained = inner.comments.len(), "comment stored in memory");
        Ok(comment)
    }

    fn page(&self, page: Page) -> StoreResult<Vec<Comment>> {
        let inner = self.lock()?;
        Ok(inner
            .comments
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    fn find(&self, id: i64) -> StoreResult<Option<Comment>> {
        let inner = self.lock()?;
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    fn len(&self) -> StoreResult<u64> {
        Ok(self.lock()?.comments.len() as u64)
    }
}

impl CommentStore for MemoryStore {
    fn append(&self, comment: NewComment) -> StoreFuture<'_, Comment> {
        let result = self.insert(comment, Utc::now());
        Box::pin(async move { result })
    }

    fn list_recent(&self, page: Page) -> StoreFuture<'_, Vec<Comment>> {
        let result = self.page(page);
        Box::pin(async move { result })
    }

    fn get(&self, id: i64) -> StoreFuture<'_, Option<Comment>> {
        let result = self.find(id);
        Box::pin(async move { result })
    }

    fn count(&self) -> StoreFuture<'_, u64> {
        let result = self.len();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_comment(n: usize) -> NewComment {
        NewComment {
            email: format!("user{n}@example.com"),
            comment: format!("comment {n}"),
            color: "black".to_string(),
            ip_hash: None,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn append_then_list_newest_first() {
        let store = MemoryStore::default();
        let first = store.append(new_comment(1)).await.unwrap();
        let second = store.append(new_comment(2)).await.unwrap();

        let list = store.list_recent(Page::default()).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let store = MemoryStore::default();
        let now = Utc::now();
        let a = store.insert(new_comment(1), now).unwrap();
        let b = store.insert(new_comment(2), now).unwrap();
        assert_eq!(a.id, now.timestamp_millis());
        assert_eq!(b.id, a.id + 1);
    }

    #[tokio::test]
    async fn evicts_oldest_past_capacity() {
        let store = MemoryStore::default();
        let mut ids = Vec::new();
        for n in 0..101 {
            ids.push(store.append(new_comment(n)).await.unwrap().id);
        }

        assert_eq!(store.count().await.unwrap(), 100);
        let list = store.list_recent(Page::default()).await.unwrap();
        assert_eq!(list.len(), 100);
        assert_eq!(list[0].id, ids[100]);
        assert_eq!(list[99].id, ids[1]);
        assert!(store.get(ids[0]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_respects_page_window() {
        let store = MemoryStore::new(10);
        for n in 0..5 {
            store.append(new_comment(n)).await.unwrap();
        }

        let page = store.list_recent(Page::new(2, 1)).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].comment, "comment 3");
        assert_eq!(page[1].comment, "comment 2");

        let past_end = store.list_recent(Page::new(10, 10)).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn get_finds_appended_comment() {
        let store = MemoryStore::default();
        let created = store.append(new_comment(7)).await.unwrap();
        let found = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = MemoryStore::new(3);
        store.append(new_comment(1)).await.unwrap();
        store.reset().unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(MemoryStore::new(0).capacity(), 1);
    }
}
