//! Like counters on posts.
//!
//! Counts change through the store's atomic adjustment, never through a
//! read-modify-write in the service. A dislike at zero succeeds and leaves
//! the count at zero.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::PostStore;
use crate::domain::store_errors::map_post_store_error;
use crate::domain::{Error, LikeDelta, PostId};

/// Monotonic, floor-clamped like counter per post.
#[derive(Clone)]
pub struct EngagementService {
    posts: Arc<dyn PostStore>,
}

impl EngagementService {
    /// Build the service over the post store.
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// Add one like and return the new count.
    pub async fn like(&self, id: &PostId) -> Result<u64, Error> {
        self.adjust(id, LikeDelta::Increment).await
    }

    /// Remove one like, clamped at zero, and return the new count.
    pub async fn dislike(&self, id: &PostId) -> Result<u64, Error> {
        self.adjust(id, LikeDelta::Decrement).await
    }

    async fn adjust(&self, id: &PostId, delta: LikeDelta) -> Result<u64, Error> {
        let count = self
            .posts
            .adjust_likes(id, delta)
            .await
            .map_err(map_post_store_error)?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))?;
        debug!(post_id = %id, ?delta, like_count = count, "like count adjusted");
        Ok(count)
    }
}
