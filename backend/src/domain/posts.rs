//! Post authoring use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::authorization::require_owner;
use crate::domain::ports::{CredentialStore, PostStore};
use crate::domain::store_errors::{map_credential_store_error, map_post_store_error};
use crate::domain::{Error, Handle, Post, PostDraft, PostId};

/// Create, read, edit, and delete posts.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    /// Build the service over the post and credential stores.
    pub fn new(
        posts: Arc<dyn PostStore>,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            credentials,
            clock,
        }
    }

    /// Publish a post authored by `caller`.
    pub async fn create(&self, caller: &Handle, draft: PostDraft) -> Result<Post, Error> {
        let author = self
            .credentials
            .find_by_handle(caller)
            .await
            .map_err(map_credential_store_error)?;
        if author.is_none() {
            return Err(Error::not_found(format!("account {caller} not found")));
        }

        let post = Post::new(caller.clone(), draft, self.clock.utc());
        self.posts
            .insert(&post)
            .await
            .map_err(map_post_store_error)?;
        info!(post_id = %post.id, author = %caller, "post created");
        Ok(post)
    }

    /// Fetch one post.
    pub async fn get(&self, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find(id)
            .await
            .map_err(map_post_store_error)?
            .ok_or_else(|| post_not_found(id))
    }

    /// Posts by `author`, newest first.
    pub async fn list_by_author(&self, author: &Handle) -> Result<Vec<Post>, Error> {
        self.posts
            .list_by_author(author)
            .await
            .map_err(map_post_store_error)
    }

    /// Every post, newest first.
    pub async fn list_all(&self) -> Result<Vec<Post>, Error> {
        self.posts.list_all().await.map_err(map_post_store_error)
    }

    /// Replace title and content. Only the author may edit.
    pub async fn update(
        &self,
        caller: &Handle,
        id: &PostId,
        draft: PostDraft,
    ) -> Result<Post, Error> {
        let existing = self.get(id).await?;
        require_owner(caller, &existing.author, "edit")?;
        self.posts
            .update_content(id, &draft, self.clock.utc())
            .await
            .map_err(map_post_store_error)?
            .ok_or_else(|| post_not_found(id))
    }

    /// Remove a post. Only the author may delete.
    pub async fn delete(&self, caller: &Handle, id: &PostId) -> Result<(), Error> {
        let existing = self.get(id).await?;
        require_owner(caller, &existing.author, "delete")?;
        let deleted = self.posts.delete(id).await.map_err(map_post_store_error)?;
        if !deleted {
            return Err(post_not_found(id));
        }
        info!(post_id = %id, author = %caller, "post deleted");
        Ok(())
    }
}

fn post_not_found(id: &PostId) -> Error {
    Error::not_found(format!("post {id} not found"))
}
