//! Social graph service behaviour against a mocked credential store.

use std::collections::BTreeSet;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{CredentialStoreError, MockCredentialStore};
use crate::domain::{DisplayName, EmailAddress, PasswordHash};
use crate::test_support::{MutableClock, fixture_timestamp};
use rstest::rstest;

fn handle(raw: &str) -> Handle {
    Handle::new(raw).expect("valid handle")
}

fn identity(raw: &str, following: &[&str], password_hash: PasswordHash) -> Identity {
    Identity {
        handle: handle(raw),
        name: DisplayName::new(raw).expect("valid name"),
        email: EmailAddress::new(format!("{raw}@example.com")).expect("valid email"),
        password_hash,
        followers: BTreeSet::new(),
        following: following.iter().map(|h| handle(h)).collect(),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

fn plain(raw: &str, following: &[&str]) -> Identity {
    identity(raw, following, PasswordHash::from_phc("unused"))
}

fn service(store: MockCredentialStore) -> SocialGraphService {
    SocialGraphService::new(
        Arc::new(store),
        PasswordHasher::new(),
        Arc::new(MutableClock::new(fixture_timestamp())),
    )
}

fn store_with(accounts: Vec<Identity>) -> MockCredentialStore {
    let mut store = MockCredentialStore::new();
    store.expect_find_by_handle().returning(move |wanted| {
        Ok(accounts.iter().find(|a| &a.handle == wanted).cloned())
    });
    store
}

#[rstest]
#[tokio::test]
async fn follow_applies_edge_stamped_by_clock() {
    let mut store = store_with(vec![plain("alice", &[]), plain("bob", &[])]);
    store
        .expect_apply_follow_edge()
        .withf(|edge, op| {
            edge.follower.as_ref() == "alice"
                && edge.followed.as_ref() == "bob"
                && edge.changed_at == fixture_timestamp()
                && *op == EdgeOp::Add
        })
        .times(1)
        .return_once(|_, _| Ok(EdgeOutcome::Applied));

    service(store)
        .follow(&handle("alice"), &handle("bob"))
        .await
        .expect("follow succeeds");
}

#[rstest]
#[tokio::test]
async fn self_follow_is_forbidden_without_store_access() {
    let mut store = MockCredentialStore::new();
    store.expect_find_by_handle().times(0);
    store.expect_apply_follow_edge().times(0);

    let err = service(store)
        .follow(&handle("alice"), &handle("alice"))
        .await
        .expect_err("self follow must fail");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn repeated_follow_reports_already_following() {
    let mut store = store_with(vec![plain("alice", &["bob"]), plain("bob", &[])]);
    store.expect_apply_follow_edge().times(0);

    let err = service(store)
        .follow(&handle("alice"), &handle("bob"))
        .await
        .expect_err("repeat follow must fail");
    assert_eq!(err.code(), ErrorCode::AlreadyFollowing);
}

#[rstest]
#[tokio::test]
async fn concurrent_duplicate_follow_reports_already_following() {
    let mut store = store_with(vec![plain("alice", &[]), plain("bob", &[])]);
    store
        .expect_apply_follow_edge()
        .return_once(|_, _| Ok(EdgeOutcome::Unchanged));

    let err = service(store)
        .follow(&handle("alice"), &handle("bob"))
        .await
        .expect_err("store reports no change");
    assert_eq!(err.code(), ErrorCode::AlreadyFollowing);
}

#[rstest]
#[case("ghost", "bob")]
#[case("alice", "ghost")]
#[tokio::test]
async fn follow_requires_both_accounts(#[case] follower: &str, #[case] followed: &str) {
    let mut store = store_with(vec![plain("alice", &[]), plain("bob", &[])]);
    store.expect_apply_follow_edge().times(0);

    let err = service(store)
        .follow(&handle(follower), &handle(followed))
        .await
        .expect_err("missing account must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unfollow_without_edge_reports_not_following() {
    let mut store = store_with(vec![plain("alice", &[]), plain("bob", &[])]);
    store.expect_apply_follow_edge().times(0);

    let err = service(store)
        .unfollow(&handle("alice"), &handle("bob"))
        .await
        .expect_err("unfollow without edge must fail");
    assert_eq!(err.code(), ErrorCode::NotFollowing);
}

#[rstest]
#[tokio::test]
async fn unfollow_removes_edge() {
    let mut store = store_with(vec![plain("alice", &["bob"]), plain("bob", &[])]);
    store
        .expect_apply_follow_edge()
        .withf(|_, op| *op == EdgeOp::Remove)
        .times(1)
        .return_once(|_, _| Ok(EdgeOutcome::Applied));

    service(store)
        .unfollow(&handle("alice"), &handle("bob"))
        .await
        .expect("unfollow succeeds");
}

#[rstest]
#[tokio::test]
async fn self_unfollow_is_forbidden() {
    let err = service(MockCredentialStore::new())
        .unfollow(&handle("alice"), &handle("alice"))
        .await
        .expect_err("self unfollow must fail");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn list_following_returns_sorted_handles() {
    let store = store_with(vec![plain("alice", &["carol", "bob"])]);
    let following = service(store)
        .list_following(&handle("alice"))
        .await
        .expect("listing succeeds");
    assert_eq!(following, vec![handle("bob"), handle("carol")]);
}

#[rstest]
#[tokio::test]
async fn list_followers_of_unknown_account_is_not_found() {
    let store = store_with(vec![]);
    let err = service(store)
        .list_followers(&handle("ghost"))
        .await
        .expect_err("unknown handle must fail");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn store_failures_surface_as_storage_unavailable() {
    let mut store = MockCredentialStore::new();
    store
        .expect_find_by_handle()
        .return_once(|_| Err(CredentialStoreError::connection("refused")));

    let err = service(store)
        .list_followers(&handle("alice"))
        .await
        .expect_err("store failure must surface");
    assert_eq!(err.code(), ErrorCode::StorageUnavailable);
}

#[rstest]
#[tokio::test]
async fn password_rotation_is_owner_only() {
    let mut store = MockCredentialStore::new();
    store.expect_update_password_hash().times(0);

    let err = service(store)
        .update_password(&handle("eve"), &handle("alice"), "old", "new")
        .await
        .expect_err("non-owner must fail");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn password_rotation_rejects_wrong_current_secret() {
    let hash = PasswordHasher::new().hash("old").expect("hashing succeeds");
    let mut store = store_with(vec![identity("alice", &[], hash)]);
    store.expect_update_password_hash().times(0);

    let err = service(store)
        .update_password(&handle("alice"), &handle("alice"), "wrong", "new")
        .await
        .expect_err("wrong password must fail");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn password_rotation_rejects_empty_new_secret() {
    let mut store = MockCredentialStore::new();
    store.expect_update_password_hash().times(0);

    let err = service(store)
        .update_password(&handle("alice"), &handle("alice"), "old", "")
        .await
        .expect_err("empty password must fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn password_rotation_stores_a_hash_of_the_new_secret() {
    let hasher = PasswordHasher::new();
    let hash = hasher.hash("old").expect("hashing succeeds");
    let mut store = store_with(vec![identity("alice", &[], hash)]);
    store
        .expect_update_password_hash()
        .withf(|h, stored, at| {
            h.as_ref() == "alice"
                && PasswordHasher::new().verify(stored, "new").is_ok()
                && *at == fixture_timestamp()
        })
        .times(1)
        .return_once(|_, _, _| Ok(true));

    service(store)
        .update_password(&handle("alice"), &handle("alice"), "old", "new")
        .await
        .expect("rotation succeeds");
}
