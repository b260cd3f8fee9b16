//! `PostStore` backed by a locked vector kept in insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{PostStore, PostStoreError};
use crate::domain::{Handle, LikeDelta, Post, PostDraft, PostId};

/// In-memory post store.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; posts sharing a timestamp keep reverse insertion order.
fn newest_first<'a>(posts: impl DoubleEndedIterator<Item = &'a Post>) -> Vec<Post> {
    let mut listed: Vec<Post> = posts.rev().cloned().collect();
    listed.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    listed
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|existing| existing.id == post.id) {
            return Err(PostStoreError::query(format!("post {} already exists", post.id)));
        }
        posts.push(post.clone());
        Ok(())
    }

    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|post| &post.id == id).cloned())
    }

    async fn list_by_author(&self, author: &Handle) -> Result<Vec<Post>, PostStoreError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.iter().filter(|post| &post.author == author)))
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.iter()))
    }

    async fn update_content(
        &self,
        id: &PostId,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostStoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.iter_mut().find(|post| &post.id == id).map(|post| {
            post.title = draft.title().to_owned();
            post.content = draft.content().to_owned();
            post.updated_at = updated_at;
            post.clone()
        }))
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| &post.id != id);
        Ok(posts.len() != before)
    }

    async fn delete_by_author(&self, author: &Handle) -> Result<u64, PostStoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|post| &post.author != author);
        Ok((before - posts.len()) as u64)
    }

    async fn adjust_likes(
        &self,
        id: &PostId,
        delta: LikeDelta,
    ) -> Result<Option<u64>, PostStoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.iter_mut().find(|post| &post.id == id).map(|post| {
            post.like_count = match delta {
                LikeDelta::Increment => post.like_count.saturating_add(1),
                LikeDelta::Decrement => post.like_count.saturating_sub(1),
            };
            post.like_count
        }))
    }
}
