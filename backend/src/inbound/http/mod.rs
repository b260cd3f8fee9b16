//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod posts;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Registration and login are public; every other handler extracts an
/// [`auth::AuthenticatedUser`] and fails with `401` without a valid token.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .service(users::register)
        .service(users::login)
        .service(users::search_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::follow_user)
        .service(users::unfollow_user)
        .service(users::list_followers)
        .service(users::list_following)
        .service(users::update_password)
        .service(posts::list_user_posts)
        .service(posts::create_post)
        .service(posts::list_posts)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(posts::like_post)
        .service(posts::dislike_post);
}
