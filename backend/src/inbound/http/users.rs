//! Account and follow-graph handlers.
//!
//! ```text
//! POST   /api/v1/users                      {"name","handle","email","password"}
//! POST   /api/v1/login                      {"email","password"}
//! GET    /api/v1/users?q=fragment
//! GET    /api/v1/users/{handle}
//! PUT    /api/v1/users/{handle}             {"name","email"}
//! DELETE /api/v1/users/{handle}
//! POST   /api/v1/users/{handle}/follow
//! DELETE /api/v1/users/{handle}/follow
//! GET    /api/v1/users/{handle}/followers
//! GET    /api/v1/users/{handle}/following
//! POST   /api/v1/users/{handle}/password    {"current","new"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    DisplayName, EmailAddress, Handle, Identity, LoginCredentials, LoginSession, Registration,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_user_validation_error, parse_handle};

/// Sign-up body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Requested handle.
    pub handle: String,
    /// Email address used to log in.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Handle of the logged-in account.
    pub handle: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

impl From<LoginSession> for LoginResponse {
    fn from(session: LoginSession) -> Self {
        Self {
            handle: session.handle.to_string(),
            token: session.token.to_string(),
        }
    }
}

/// Profile edit body for `PUT /api/v1/users/{handle}`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Replacement display name.
    pub name: String,
    /// Replacement email address.
    pub email: String,
}

/// Password rotation body for `POST /api/v1/users/{handle}/password`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Password in force now.
    pub current: String,
    /// Replacement password.
    pub new: String,
}

/// Query string for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Substring matched against handles and names.
    pub q: Option<String>,
}

/// Public account representation. The password hash never leaves the domain.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Account handle.
    pub handle: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Handles following this account, sorted.
    pub followers: Vec<String>,
    /// Handles this account follows, sorted.
    pub following: Vec<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile or password change.
    pub updated_at: DateTime<Utc>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            handle: identity.handle.to_string(),
            name: identity.name.to_string(),
            email: identity.email.to_string(),
            followers: handles(identity.followers),
            following: handles(identity.following),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

fn handles(set: impl IntoIterator<Item = Handle>) -> Vec<String> {
    set.into_iter().map(|handle| handle.to_string()).collect()
}

/// Register a new account. Public.
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        name,
        handle,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&name, &handle, &email, &password)
        .map_err(map_user_validation_error)?;
    let identity = state.accounts.register(&registration).await?;
    info!(handle = %identity.handle, "account registered");
    Ok(HttpResponse::Created().json(UserResponse::from(identity)))
}

/// Exchange email and password for a bearer token. Public.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_user_validation_error)?;
    let session = state.accounts.login(&credentials).await?;
    Ok(web::Json(session.into()))
}

/// Search accounts by handle or name fragment; no fragment lists everyone.
#[get("/users")]
pub async fn search_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let fragment = query.into_inner().q.unwrap_or_default();
    let found = state.accounts.search(&fragment).await?;
    Ok(web::Json(found.into_iter().map(UserResponse::from).collect()))
}

#[get("/users/{handle}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let handle = parse_handle(&path)?;
    let identity = state.accounts.get(&handle).await?;
    Ok(web::Json(identity.into()))
}

/// Edit name and email of the caller's own account.
#[put("/users/{handle}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let handle = parse_handle(&path)?;
    let UpdateProfileRequest { name, email } = payload.into_inner();
    let name = DisplayName::new(name).map_err(map_user_validation_error)?;
    let email = EmailAddress::new(email).map_err(map_user_validation_error)?;
    let identity = state
        .accounts
        .update_profile(caller.handle(), &handle, name, email)
        .await?;
    Ok(web::Json(identity.into()))
}

#[delete("/users/{handle}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let handle = parse_handle(&path)?;
    state
        .accounts
        .delete_account(caller.handle(), &handle)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller starts following `{handle}`.
#[post("/users/{handle}/follow")]
pub async fn follow_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let followed = parse_handle(&path)?;
    state.social_graph.follow(caller.handle(), &followed).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller stops following `{handle}`.
#[delete("/users/{handle}/follow")]
pub async fn unfollow_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let followed = parse_handle(&path)?;
    state
        .social_graph
        .unfollow(caller.handle(), &followed)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/{handle}/followers")]
pub async fn list_followers(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<String>>> {
    let handle = parse_handle(&path)?;
    let followers = state.social_graph.list_followers(&handle).await?;
    Ok(web::Json(handles(followers)))
}

#[get("/users/{handle}/following")]
pub async fn list_following(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<String>>> {
    let handle = parse_handle(&path)?;
    let following = state.social_graph.list_following(&handle).await?;
    Ok(web::Json(handles(following)))
}

/// Rotate the caller's password after re-checking the current one.
#[post("/users/{handle}/password")]
pub async fn update_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdatePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let handle = parse_handle(&path)?;
    let UpdatePasswordRequest { current, new } = payload.into_inner();
    state
        .social_graph
        .update_password(caller.handle(), &handle, &current, &new)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PasswordHash;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::collections::BTreeSet;

    #[rstest]
    fn user_response_omits_the_password_hash() {
        let identity = Identity {
            handle: Handle::new("ada").expect("valid handle"),
            name: DisplayName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password_hash: PasswordHash::from_phc("$argon2id$secret"),
            followers: BTreeSet::from([Handle::new("bob").expect("valid handle")]),
            following: BTreeSet::new(),
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        };

        let value = serde_json::to_value(UserResponse::from(identity)).expect("serialises");
        assert_eq!(value["handle"], json!("ada"));
        assert_eq!(value["followers"], json!(["bob"]));
        assert!(value.get("createdAt").is_some());
        let text = value.to_string();
        assert!(!text.contains("argon2"));
        assert!(value.get("passwordHash").is_none());
        assert!(matches!(value.get("following"), Some(Value::Array(items)) if items.is_empty()));
    }
}
