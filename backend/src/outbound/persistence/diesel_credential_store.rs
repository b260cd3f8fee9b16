//! PostgreSQL-backed `CredentialStore` implementation using Diesel ORM.
//!
//! Follow edges live in the `follows` table, one row per directed edge. The
//! `followers` and `following` sets of an [`Identity`] are both projections
//! of those rows, so adding or removing a row changes both sides at once.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{
    CredentialStore, CredentialStoreError, EdgeOp, EdgeOutcome, FollowEdge,
};
use crate::domain::{
    DisplayName, EmailAddress, Handle, Identity, NewIdentity, PasswordHash, ProfileUpdate,
};

use super::diesel_error_mapping::{self, unique_violation};
use super::models::{NewFollowRow, NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the credential store port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
}

impl DieselCredentialStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CredentialStoreError {
    diesel_error_mapping::map_pool_error(error, |message| {
        CredentialStoreError::connection(message)
    })
}

fn map_diesel_error(error: DieselError) -> CredentialStoreError {
    diesel_error_mapping::map_diesel_error(
        error,
        |message| CredentialStoreError::query(message),
        |message| CredentialStoreError::connection(message),
    )
}

/// Map a write failure, translating unique violations into duplicates.
fn map_write_error(error: DieselError, handle: &str, email: &str) -> CredentialStoreError {
    match unique_violation(&error) {
        Some(EMAIL_CONSTRAINT) => CredentialStoreError::duplicate_email(email),
        Some(_) => CredentialStoreError::duplicate_handle(handle),
        None => map_diesel_error(error),
    }
}

#[derive(Default)]
struct FollowSets {
    followers: BTreeSet<Handle>,
    following: BTreeSet<Handle>,
}

fn parse_handle(raw: &str) -> Result<Handle, CredentialStoreError> {
    Handle::new(raw)
        .map_err(|err| CredentialStoreError::query(format!("stored handle invalid: {err}")))
}

fn row_to_identity(row: UserRow, sets: FollowSets) -> Result<Identity, CredentialStoreError> {
    let UserRow {
        handle,
        name,
        email,
        password_hash,
        created_at,
        updated_at,
    } = row;
    let invalid = |err: crate::domain::UserValidationError| {
        CredentialStoreError::query(format!("stored account invalid: {err}"))
    };
    Ok(Identity {
        handle: parse_handle(&handle)?,
        name: DisplayName::new(name).map_err(invalid)?,
        email: EmailAddress::new(email).map_err(invalid)?,
        password_hash: PasswordHash::from_phc(password_hash),
        followers: sets.followers,
        following: sets.following,
        created_at,
        updated_at,
    })
}

/// Load follow sets for every handle in `handles` with two queries.
async fn load_follow_sets(
    conn: &mut AsyncPgConnection,
    handles: &[String],
) -> Result<HashMap<String, FollowSets>, CredentialStoreError> {
    let outgoing: Vec<(String, String)> = follows::table
        .filter(follows::follower_handle.eq_any(handles))
        .select((follows::follower_handle, follows::followed_handle))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let incoming: Vec<(String, String)> = follows::table
        .filter(follows::followed_handle.eq_any(handles))
        .select((follows::follower_handle, follows::followed_handle))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut sets: HashMap<String, FollowSets> = HashMap::new();
    for (follower, followed) in outgoing {
        let target = parse_handle(&followed)?;
        sets.entry(follower).or_default().following.insert(target);
    }
    for (follower, followed) in incoming {
        let source = parse_handle(&follower)?;
        sets.entry(followed).or_default().followers.insert(source);
    }
    Ok(sets)
}

async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<UserRow>,
) -> Result<Vec<Identity>, CredentialStoreError> {
    let handles: Vec<String> = rows.iter().map(|row| row.handle.clone()).collect();
    let mut sets = load_follow_sets(conn, &handles).await?;
    rows.into_iter()
        .map(|row| {
            let follow_sets = sets.remove(&row.handle).unwrap_or_default();
            row_to_identity(row, follow_sets)
        })
        .collect()
}

async fn hydrate_one(
    conn: &mut AsyncPgConnection,
    row: Option<UserRow>,
) -> Result<Option<Identity>, CredentialStoreError> {
    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Escape `LIKE` wildcards so the fragment matches literally.
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn create(&self, identity: &NewIdentity) -> Result<Identity, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            handle: identity.handle.as_ref(),
            name: identity.name.as_ref(),
            email: identity.email.as_ref(),
            password_hash: identity.password_hash.as_str(),
            created_at: identity.created_at,
            updated_at: identity.created_at,
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_write_error(err, identity.handle.as_ref(), identity.email.as_ref())
            })?;
        Ok(identity.clone().into_identity())
    }

    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(handle.as_ref())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        hydrate_one(&mut conn, row).await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        hydrate_one(&mut conn, row).await
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Identity>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = like_pattern(fragment);
        let rows: Vec<UserRow> = users::table
            .filter(
                users::handle
                    .ilike(&pattern)
                    .or(users::name.ilike(&pattern)),
            )
            .order(users::handle.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn update_profile(
        &self,
        handle: &Handle,
        update: &ProfileUpdate,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserProfileChangeset {
            name: update.name.as_ref(),
            email: update.email.as_ref(),
            updated_at: update.updated_at,
        };
        let row = diesel::update(users::table.find(handle.as_ref()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, handle.as_ref(), update.email.as_ref()))?;
        hydrate_one(&mut conn, row).await
    }

    async fn update_password_hash(
        &self,
        handle: &Handle,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.find(handle.as_ref()))
            .set((
                users::password_hash.eq(hash.as_str()),
                users::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, handle: &Handle) -> Result<bool, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Follow rows and posts go with the account through ON DELETE CASCADE.
        let affected = diesel::delete(users::table.find(handle.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn apply_follow_edge(
        &self,
        edge: &FollowEdge,
        op: EdgeOp,
    ) -> Result<EdgeOutcome, CredentialStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let follower = edge.follower.as_ref();
        let followed = edge.followed.as_ref();
        let created_at = edge.changed_at;

        conn.transaction(|conn| {
            async move {
                let present: i64 = users::table
                    .filter(users::handle.eq_any([follower, followed]))
                    .count()
                    .get_result(conn)
                    .await?;
                if present < 2 {
                    return Ok(EdgeOutcome::MissingAccount);
                }

                let affected = match op {
                    EdgeOp::Add => {
                        diesel::insert_into(follows::table)
                            .values(&NewFollowRow {
                                follower_handle: follower,
                                followed_handle: followed,
                                created_at,
                            })
                            .on_conflict((follows::follower_handle, follows::followed_handle))
                            .do_nothing()
                            .execute(conn)
                            .await?
                    }
                    EdgeOp::Remove => {
                        diesel::delete(follows::table.find((follower, followed)))
                            .execute(conn)
                            .await?
                    }
                };
                Ok(if affected == 0 {
                    EdgeOutcome::Unchanged
                } else {
                    EdgeOutcome::Applied
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
