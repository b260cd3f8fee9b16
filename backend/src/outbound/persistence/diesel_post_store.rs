//! PostgreSQL-backed `PostStore` implementation using Diesel ORM.
//!
//! Like counters are adjusted with single `UPDATE ... RETURNING` statements so
//! concurrent likes never lose increments. Decrements carry a `like_count > 0`
//! guard; the table's check constraint backs that up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostStore, PostStoreError};
use crate::domain::{Handle, LikeDelta, Post, PostDraft, PostId};

use super::diesel_error_mapping::{self, is_foreign_key_violation};
use super::models::{NewPostRow, PostContentChangeset, PostRow};
use super::pool::{DbPool, PoolError};
use super::schema::posts;

/// Diesel-backed implementation of the post store port.
#[derive(Clone)]
pub struct DieselPostStore {
    pool: DbPool,
}

impl DieselPostStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostStoreError {
    diesel_error_mapping::map_pool_error(error, |message| PostStoreError::connection(message))
}

fn map_diesel_error(error: DieselError) -> PostStoreError {
    diesel_error_mapping::map_diesel_error(
        error,
        |message| PostStoreError::query(message),
        |message| PostStoreError::connection(message),
    )
}

fn row_to_post(row: PostRow) -> Result<Post, PostStoreError> {
    let PostRow {
        id,
        title,
        content,
        author_handle,
        like_count,
        created_at,
        updated_at,
    } = row;
    let author = Handle::new(&author_handle)
        .map_err(|err| PostStoreError::query(format!("stored author invalid: {err}")))?;
    Ok(Post {
        id: PostId::from_uuid(id),
        title,
        content,
        author,
        like_count: counter_from_row(like_count),
        created_at,
        updated_at,
    })
}

fn counter_from_row(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn rows_to_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, PostStoreError> {
    rows.into_iter().map(row_to_post).collect()
}

#[async_trait]
impl PostStore for DieselPostStore {
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let like_count = i64::try_from(post.like_count)
            .map_err(|_| PostStoreError::query("like count out of range"))?;
        let row = NewPostRow {
            id: *post.id.as_uuid(),
            title: post.title.as_str(),
            content: post.content.as_str(),
            author_handle: post.author.as_ref(),
            like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };

        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    PostStoreError::query(format!("author {} does not exist", post.author))
                } else {
                    map_diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = posts::table
            .find(id.as_uuid())
            .select(PostRow::as_select())
            .first::<PostRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn list_by_author(&self, author: &Handle) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .filter(posts::author_handle.eq(author.as_ref()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_posts(rows)
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .order((posts::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_posts(rows)
    }

    async fn update_content(
        &self,
        id: &PostId,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = PostContentChangeset {
            title: draft.title(),
            content: draft.content(),
            updated_at,
        };
        let row = diesel::update(posts::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(PostRow::as_returning())
            .get_result::<PostRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(posts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete_by_author(&self, author: &Handle) -> Result<u64, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(posts::table.filter(posts::author_handle.eq(author.as_ref())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected as u64)
    }

    async fn adjust_likes(
        &self,
        id: &PostId,
        delta: LikeDelta,
    ) -> Result<Option<u64>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = posts::table.find(id.as_uuid());

        let adjusted = match delta {
            LikeDelta::Increment => diesel::update(target)
                .set(posts::like_count.eq(posts::like_count + 1))
                .returning(posts::like_count)
                .get_result::<i64>(&mut conn)
                .await
                .optional(),
            LikeDelta::Decrement => diesel::update(target.filter(posts::like_count.gt(0)))
                .set(posts::like_count.eq(posts::like_count - 1))
                .returning(posts::like_count)
                .get_result::<i64>(&mut conn)
                .await
                .optional(),
        }
        .map_err(map_diesel_error)?;

        if let Some(count) = adjusted {
            return Ok(Some(counter_from_row(count)));
        }

        // No row changed: either the post is missing or a dislike hit zero.
        let current = posts::table
            .find(id.as_uuid())
            .select(posts::like_count)
            .first::<i64>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(current.map(counter_from_row))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; SQL paths need a live database.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(author: &str, like_count: i64) -> PostRow {
        let now = Utc::now();
        PostRow {
            id: Uuid::new_v4(),
            title: "Hello".to_owned(),
            content: "World".to_owned(),
            author_handle: author.to_owned(),
            like_count,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn converts_rows_into_posts() {
        let source = row("ada", 3);
        let id = source.id;
        let post = row_to_post(source).expect("row converts");
        assert_eq!(post.id.as_uuid(), &id);
        assert_eq!(post.author.as_ref(), "ada");
        assert_eq!(post.like_count, 3);
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, 0)]
    #[case(7, 7)]
    fn negative_counters_clamp_to_zero(#[case] stored: i64, #[case] expected: u64) {
        assert_eq!(counter_from_row(stored), expected);
    }

    #[rstest]
    fn rejects_corrupt_author_handles() {
        let err = row_to_post(row("bad handle", 0)).expect_err("corrupt author");
        assert!(matches!(err, PostStoreError::Query { .. }));
    }
}
