//! End-to-end HTTP scenarios over the in-memory stores.
//!
//! Each test assembles the full `/api/v1` surface with the trace middleware
//! and a manually advanced clock, then drives it through `actix_web::test`.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use agora_backend::Trace;
use agora_backend::domain::TRACE_ID_HEADER;
use agora_backend::inbound::http::configure_api;
use agora_backend::inbound::http::state::{HttpState, HttpStatePorts};
use agora_backend::outbound::memory::{InMemoryCredentialStore, InMemoryPostStore};
use agora_backend::test_support::{MutableClock, fixture_timestamp, token_service};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(fixture_timestamp()))
}

fn http_state(clock: &Arc<MutableClock>) -> web::Data<HttpState> {
    let ports = HttpStatePorts {
        credentials: Arc::new(InMemoryCredentialStore::new()),
        posts: Arc::new(InMemoryPostStore::new()),
    };
    web::Data::new(HttpState::new(
        ports,
        Arc::new(token_service(clock.clone())),
        clock.clone(),
    ))
}

macro_rules! api {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(configure_api)),
        )
        .await
    };
}

/// Send `$req` and return the status with the decoded body (`Null` when empty).
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let response = test::call_service(&$app, $req.to_request()).await;
        let status = response.status();
        let body = test::read_body(response).await;
        let json: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        (status, json)
    }};
}

macro_rules! register {
    ($app:expr, $handle:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/api/v1/users").set_json(json!({
                "name": format!("{} Example", $handle),
                "handle": $handle,
                "email": format!("{}@example.com", $handle),
                "password": "correct horse",
            }))
        );
        assert_eq!(status, StatusCode::CREATED, "register {}: {body}", $handle);
        body
    }};
}

macro_rules! login {
    ($app:expr, $handle:expr, $password:expr) => {{
        send!(
            $app,
            test::TestRequest::post().uri("/api/v1/login").set_json(json!({
                "email": format!("{}@example.com", $handle),
                "password": $password,
            }))
        )
    }};
}

macro_rules! token {
    ($app:expr, $handle:expr) => {{
        let (status, body) = login!($app, $handle, "correct horse");
        assert_eq!(status, StatusCode::OK, "login {}: {body}", $handle);
        body["token"].as_str().expect("token string").to_owned()
    }};
}

fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

fn handles(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|value| value.as_str().expect("handle string"))
        .collect()
}

#[rstest]
#[actix_web::test]
async fn registration_hides_password_and_login_issues_token(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);

    let created = register!(app, "ada");
    assert_eq!(created["handle"], "ada");
    assert_eq!(created["followers"], json!([]));
    assert!(created.get("passwordHash").is_none());
    assert!(created.get("password").is_none());

    let (status, body) = login!(app, "ada", "correct horse");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handle"], "ada");
    assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));

    let (status, body) = login!(app, "ada", "wrong horse");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn duplicate_handles_and_emails_conflict(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Other",
            "handle": "ada",
            "email": "other@example.com",
            "password": "pw",
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Other",
            "handle": "other",
            "email": "ADA@example.com",
            "password": "pw",
        }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[rstest]
#[case("/api/v1/users")]
#[case("/api/v1/users/ada")]
#[case("/api/v1/posts")]
#[actix_web::test]
async fn protected_routes_require_a_token(clock: Arc<MutableClock>, #[case] uri: &str) {
    let state = http_state(&clock);
    let app = api!(state);

    let (status, body) = send!(app, test::TestRequest::get().uri(uri));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send!(app, authed(test::TestRequest::get().uri(uri), "not-a-jwt"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn tokens_expire_with_the_clock(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    let token = token!(app, "ada");

    let (status, _) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users/ada"), &token));
    assert_eq!(status, StatusCode::OK);

    clock.advance_seconds(6 * 60 * 60 + 1);
    let (status, _) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users/ada"), &token));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn follow_and_unfollow_keep_both_sides_in_step(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let ada = token!(app, "ada");

    let follow = || authed(test::TestRequest::post().uri("/api/v1/users/bob/follow"), &ada);
    let unfollow = || authed(test::TestRequest::delete().uri("/api/v1/users/bob/follow"), &ada);

    let (status, _) = send!(app, follow());
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send!(app, follow());
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_following");

    let (_, followers) = send!(
        app,
        authed(test::TestRequest::get().uri("/api/v1/users/bob/followers"), &ada)
    );
    assert_eq!(handles(&followers), ["ada"]);
    let (_, following) = send!(
        app,
        authed(test::TestRequest::get().uri("/api/v1/users/ada/following"), &ada)
    );
    assert_eq!(handles(&following), ["bob"]);

    let (status, _) = send!(app, unfollow());
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send!(app, unfollow());
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_following");

    let (_, bob) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users/bob"), &ada));
    assert_eq!(bob["followers"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn self_follow_is_forbidden_and_missing_targets_are_not_found(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    let ada = token!(app, "ada");

    let (status, body) = send!(
        app,
        authed(test::TestRequest::post().uri("/api/v1/users/ada/follow"), &ada)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send!(
        app,
        authed(test::TestRequest::post().uri("/api/v1/users/ghost/follow"), &ada)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn likes_never_drop_below_zero(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    let ada = token!(app, "ada");

    let (status, post) = send!(
        app,
        authed(test::TestRequest::post().uri("/api/v1/posts"), &ada)
            .set_json(json!({ "title": "Hello", "content": "World" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["likes"], 0);
    let id = post["id"].as_str().expect("post id").to_owned();

    let mut likes = Value::Null;
    for _ in 0..3 {
        let (status, body) = send!(
            app,
            authed(test::TestRequest::post().uri(&format!("/api/v1/posts/{id}/like")), &ada)
        );
        assert_eq!(status, StatusCode::OK);
        likes = body["likes"].clone();
    }
    assert_eq!(likes, 3);

    for _ in 0..5 {
        let (status, body) = send!(
            app,
            authed(test::TestRequest::post().uri(&format!("/api/v1/posts/{id}/dislike")), &ada)
        );
        assert_eq!(status, StatusCode::OK);
        likes = body["likes"].clone();
    }
    assert_eq!(likes, 0);

    let missing = Uuid::new_v4();
    let (status, _) = send!(
        app,
        authed(test::TestRequest::post().uri(&format!("/api/v1/posts/{missing}/like")), &ada)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn only_the_author_may_edit_or_delete_a_post(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let ada = token!(app, "ada");
    let bob = token!(app, "bob");

    let (_, post) = send!(
        app,
        authed(test::TestRequest::post().uri("/api/v1/posts"), &ada)
            .set_json(json!({ "title": "Hello", "content": "World" }))
    );
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().expect("post id"));

    let (status, _) = send!(
        app,
        authed(test::TestRequest::put().uri(&uri), &bob)
            .set_json(json!({ "title": "Hijack", "content": "Nope" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send!(app, authed(test::TestRequest::delete().uri(&uri), &bob));
    assert_eq!(status, StatusCode::FORBIDDEN);

    clock.advance_seconds(60);
    let (status, edited) = send!(
        app,
        authed(test::TestRequest::put().uri(&uri), &ada)
            .set_json(json!({ "title": "Hello again", "content": "Edited" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["title"], "Hello again");
    assert_ne!(edited["updatedAt"], edited["createdAt"]);

    let (status, _) = send!(app, authed(test::TestRequest::delete().uri(&uri), &ada));
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send!(app, authed(test::TestRequest::get().uri(&uri), &ada));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn post_listings_are_newest_first(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let ada = token!(app, "ada");
    let bob = token!(app, "bob");

    for (token, title) in [(&ada, "first"), (&bob, "second"), (&ada, "third")] {
        clock.advance_seconds(1);
        let (status, _) = send!(
            app,
            authed(test::TestRequest::post().uri("/api/v1/posts"), token)
                .set_json(json!({ "title": title, "content": "body" }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let titles = |body: &Value| -> Vec<String> {
        body.as_array()
            .expect("array body")
            .iter()
            .map(|post| post["title"].as_str().expect("title").to_owned())
            .collect()
    };
    let (_, all) = send!(app, authed(test::TestRequest::get().uri("/api/v1/posts"), &bob));
    assert_eq!(titles(&all), ["third", "second", "first"]);
    let (_, by_ada) = send!(
        app,
        authed(test::TestRequest::get().uri("/api/v1/users/ada/posts"), &bob)
    );
    assert_eq!(titles(&by_ada), ["third", "first"]);
}

#[rstest]
#[actix_web::test]
async fn password_rotation_requires_the_current_password(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    let ada = token!(app, "ada");
    let rotate = |current: &str| {
        authed(test::TestRequest::post().uri("/api/v1/users/ada/password"), &ada)
            .set_json(json!({ "current": current, "new": "battery staple" }))
    };

    let (status, _) = send!(app, rotate("guess"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login!(app, "ada", "correct horse");
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(app, rotate("correct horse"));
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = login!(app, "ada", "battery staple");
    assert_eq!(status, StatusCode::OK);
    let (status, _) = login!(app, "ada", "correct horse");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn accounts_are_only_editable_by_their_owner(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let bob = token!(app, "bob");

    let (status, _) = send!(
        app,
        authed(test::TestRequest::put().uri("/api/v1/users/ada"), &bob)
            .set_json(json!({ "name": "Mallory", "email": "mallory@example.com" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send!(app, authed(test::TestRequest::delete().uri("/api/v1/users/ada"), &bob));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send!(
        app,
        authed(test::TestRequest::put().uri("/api/v1/users/bob"), &bob)
            .set_json(json!({ "name": "Robert", "email": "robert@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Robert");
    assert_eq!(updated["handle"], "bob");
}

#[rstest]
#[actix_web::test]
async fn deleting_an_account_removes_posts_and_edges(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let ada = token!(app, "ada");
    let bob = token!(app, "bob");

    send!(app, authed(test::TestRequest::post().uri("/api/v1/users/bob/follow"), &ada));
    send!(app, authed(test::TestRequest::post().uri("/api/v1/users/ada/follow"), &bob));
    send!(
        app,
        authed(test::TestRequest::post().uri("/api/v1/posts"), &ada)
            .set_json(json!({ "title": "Hello", "content": "World" }))
    );

    let (status, _) = send!(app, authed(test::TestRequest::delete().uri("/api/v1/users/ada"), &ada));
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users/ada"), &bob));
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, remaining) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users/bob"), &bob));
    assert_eq!(remaining["followers"], json!([]));
    assert_eq!(remaining["following"], json!([]));
    let (_, posts) = send!(app, authed(test::TestRequest::get().uri("/api/v1/posts"), &bob));
    assert_eq!(posts, json!([]));
}

#[rstest]
#[actix_web::test]
async fn search_matches_handles_and_names(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);
    register!(app, "ada");
    register!(app, "bob");
    let ada = token!(app, "ada");

    let (status, found) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users?q=BO"), &ada));
    assert_eq!(status, StatusCode::OK);
    let found: Vec<&str> = found
        .as_array()
        .expect("array body")
        .iter()
        .map(|user| user["handle"].as_str().expect("handle"))
        .collect();
    assert_eq!(found, ["bob"]);

    let (_, everyone) = send!(app, authed(test::TestRequest::get().uri("/api/v1/users"), &ada));
    assert_eq!(everyone.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[actix_web::test]
async fn malformed_bodies_are_invalid_requests(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Ada",
            "handle": "has space",
            "email": "ada@example.com",
            "password": "pw",
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "handle");
}

#[rstest]
#[actix_web::test]
async fn every_response_carries_a_trace_id(clock: Arc<MutableClock>) {
    let state = http_state(&clock);
    let app = api!(state);

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/posts").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["traceId"], header.as_str());
}
