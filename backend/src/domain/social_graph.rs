//! Follow graph and password rotation.
//!
//! The service owns every mutation of the `followers` and `following` sets.
//! Edges are applied through the store's atomic edge operation so both sides
//! change together; the pre-check against the follower's `following` set
//! only exists to report a precise error without touching the store.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::authorization::require_owner;
use crate::domain::password::PasswordHasher;
use crate::domain::ports::{CredentialStore, EdgeOp, EdgeOutcome, FollowEdge};
use crate::domain::store_errors::map_credential_store_error;
use crate::domain::{Error, Handle, Identity};

/// Enforces the follow-graph mirror invariant.
#[derive(Clone)]
pub struct SocialGraphService {
    credentials: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl SocialGraphService {
    /// Build the service over the credential store.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            hasher,
            clock,
        }
    }

    async fn load(&self, handle: &Handle) -> Result<Identity, Error> {
        self.credentials
            .find_by_handle(handle)
            .await
            .map_err(map_credential_store_error)?
            .ok_or_else(|| Error::not_found(format!("account {handle} not found")))
    }

    /// Make `follower` follow `followed`.
    ///
    /// # Errors
    /// - `forbidden` when both handles are the same.
    /// - `not_found` when either account is missing.
    /// - `already_following` when the edge exists; nothing changes.
    pub async fn follow(&self, follower: &Handle, followed: &Handle) -> Result<(), Error> {
        if follower == followed {
            return Err(Error::forbidden("accounts may not follow themselves"));
        }
        let source = self.load(follower).await?;
        self.load(followed).await?;
        if source.following.contains(followed) {
            return Err(already_following(follower, followed));
        }

        let edge = FollowEdge {
            follower: follower.clone(),
            followed: followed.clone(),
            changed_at: self.clock.utc(),
        };
        match self
            .credentials
            .apply_follow_edge(&edge, EdgeOp::Add)
            .await
            .map_err(map_credential_store_error)?
        {
            EdgeOutcome::Applied => {
                info!(follower = %follower, followed = %followed, "follow edge added");
                Ok(())
            }
            EdgeOutcome::Unchanged => Err(already_following(follower, followed)),
            EdgeOutcome::MissingAccount => Err(Error::not_found("account not found")),
        }
    }

    /// Remove the edge from `follower` to `followed`.
    ///
    /// # Errors
    /// - `forbidden` when both handles are the same.
    /// - `not_found` when either account is missing.
    /// - `not_following` when the edge is absent.
    pub async fn unfollow(&self, follower: &Handle, followed: &Handle) -> Result<(), Error> {
        if follower == followed {
            return Err(Error::forbidden("accounts may not unfollow themselves"));
        }
        let source = self.load(follower).await?;
        self.load(followed).await?;
        if !source.following.contains(followed) {
            return Err(not_following(follower, followed));
        }

        let edge = FollowEdge {
            follower: follower.clone(),
            followed: followed.clone(),
            changed_at: self.clock.utc(),
        };
        match self
            .credentials
            .apply_follow_edge(&edge, EdgeOp::Remove)
            .await
            .map_err(map_credential_store_error)?
        {
            EdgeOutcome::Applied => {
                info!(follower = %follower, followed = %followed, "follow edge removed");
                Ok(())
            }
            EdgeOutcome::Unchanged => Err(not_following(follower, followed)),
            EdgeOutcome::MissingAccount => Err(Error::not_found("account not found")),
        }
    }

    /// Handles following `handle`, in handle order.
    pub async fn list_followers(&self, handle: &Handle) -> Result<Vec<Handle>, Error> {
        let identity = self.load(handle).await?;
        Ok(identity.followers.into_iter().collect())
    }

    /// Handles `handle` follows, in handle order.
    pub async fn list_following(&self, handle: &Handle) -> Result<Vec<Handle>, Error> {
        let identity = self.load(handle).await?;
        Ok(identity.following.into_iter().collect())
    }

    /// Rotate the password of `handle` after checking the current one.
    ///
    /// The stored hash is left untouched on every failure path.
    pub async fn update_password(
        &self,
        caller: &Handle,
        handle: &Handle,
        current: &str,
        new: &str,
    ) -> Result<(), Error> {
        require_owner(caller, handle, "change the password of")?;
        if new.is_empty() {
            return Err(Error::invalid_request("new password must not be empty"));
        }

        let identity = self.load(handle).await?;
        self.hasher
            .verify(&identity.password_hash, current)
            .map_err(|_| Error::unauthorized("current password is incorrect"))?;
        let hash = self
            .hasher
            .hash(new)
            .map_err(|err| Error::internal(err.to_string()))?;

        let updated = self
            .credentials
            .update_password_hash(handle, &hash, self.clock.utc())
            .await
            .map_err(map_credential_store_error)?;
        if !updated {
            return Err(Error::not_found(format!("account {handle} not found")));
        }
        info!(handle = %handle, "password rotated");
        Ok(())
    }
}

fn already_following(follower: &Handle, followed: &Handle) -> Error {
    Error::already_following(format!("{follower} already follows {followed}"))
}

fn not_following(follower: &Handle, followed: &Handle) -> Error {
    Error::not_following(format!("{follower} does not follow {followed}"))
}

#[cfg(test)]
mod tests;
