//! Port abstraction for post persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Handle, LikeDelta, Post, PostDraft, PostId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post store adapters.
    pub enum PostStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "post store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post store query failed: {message}",
    }
}

/// Driven port for post records and their like counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a new post.
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError>;

    /// Fetch a post by identifier.
    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError>;

    /// Posts written by `author`, newest first.
    async fn list_by_author(&self, author: &Handle) -> Result<Vec<Post>, PostStoreError>;

    /// Every post, newest first.
    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError>;

    /// Replace title and content. Returns `None` when the post does not exist.
    async fn update_content(
        &self,
        id: &PostId,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostStoreError>;

    /// Remove a post. Returns `false` when it does not exist.
    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError>;

    /// Remove every post written by `author`, returning how many went.
    async fn delete_by_author(&self, author: &Handle) -> Result<u64, PostStoreError>;

    /// Atomically adjust the like counter, never dropping below zero.
    ///
    /// Returns the resulting count, or `None` when the post does not exist.
    async fn adjust_likes(
        &self,
        id: &PostId,
        delta: LikeDelta,
    ) -> Result<Option<u64>, PostStoreError>;
}
