//! Post and engagement handlers.
//!
//! ```text
//! POST   /api/v1/posts                 {"title","content"}
//! GET    /api/v1/posts
//! GET    /api/v1/posts/{id}
//! PUT    /api/v1/posts/{id}            {"title","content"}
//! DELETE /api/v1/posts/{id}
//! GET    /api/v1/users/{handle}/posts
//! POST   /api/v1/posts/{id}/like
//! POST   /api/v1/posts/{id}/dislike
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Post, PostDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_post_validation_error, parse_handle, parse_post_id};

/// Body for creating or editing a post.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
}

impl TryFrom<PostRequest> for PostDraft {
    type Error = crate::domain::PostValidationError;

    fn try_from(value: PostRequest) -> Result<Self, Self::Error> {
        PostDraft::new(value.title, value.content)
    }
}

/// Post representation returned by every post endpoint.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Author handle.
    pub author: String,
    /// Current like total.
    pub likes: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: *post.id.as_uuid(),
            title: post.title,
            content: post.content,
            author: post.author.to_string(),
            likes: post.like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Like counter after a like or dislike.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    /// Post identifier.
    pub id: Uuid,
    /// Like total after the change.
    pub likes: u64,
}

fn post_list(posts: Vec<Post>) -> web::Json<Vec<PostResponse>> {
    web::Json(posts.into_iter().map(PostResponse::from).collect())
}

#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let draft = PostDraft::try_from(payload.into_inner()).map_err(map_post_validation_error)?;
    let post = state.posts.create(caller.handle(), draft).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// Every post, newest first.
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    Ok(post_list(state.posts.list_all().await?))
}

#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_post_id(&path)?;
    Ok(web::Json(state.posts.get(&id).await?.into()))
}

/// Replace title and content; author only.
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PostRequest>,
) -> ApiResult<web::Json<PostResponse>> {
    let id = parse_post_id(&path)?;
    let draft = PostDraft::try_from(payload.into_inner()).map_err(map_post_validation_error)?;
    let post = state.posts.update(caller.handle(), &id, draft).await?;
    Ok(web::Json(post.into()))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    state.posts.delete(caller.handle(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Posts written by `{handle}`, newest first.
#[get("/users/{handle}/posts")]
pub async fn list_user_posts(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let author = parse_handle(&path)?;
    Ok(post_list(state.posts.list_by_author(&author).await?))
}

#[post("/posts/{id}/like")]
pub async fn like_post(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikesResponse>> {
    let id = parse_post_id(&path)?;
    let likes = state.engagement.like(&id).await?;
    Ok(web::Json(LikesResponse {
        id: *id.as_uuid(),
        likes,
    }))
}

/// Decrement the like counter; a post at zero stays at zero.
#[post("/posts/{id}/dislike")]
pub async fn dislike_post(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikesResponse>> {
    let id = parse_post_id(&path)?;
    let likes = state.engagement.dislike(&id).await?;
    Ok(web::Json(LikesResponse {
        id: *id.as_uuid(),
        likes,
    }))
}
