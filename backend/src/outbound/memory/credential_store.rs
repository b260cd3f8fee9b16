//! `CredentialStore` backed by a locked ordered map.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    CredentialStore, CredentialStoreError, EdgeOp, EdgeOutcome, FollowEdge,
};
use crate::domain::{EmailAddress, Handle, Identity, NewIdentity, PasswordHash, ProfileUpdate};

/// In-memory account store keyed by handle.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<BTreeMap<Handle, Identity>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(
    accounts: &BTreeMap<Handle, Identity>,
    email: &EmailAddress,
    except: Option<&Handle>,
) -> bool {
    accounts
        .values()
        .any(|account| &account.email == email && Some(&account.handle) != except)
}

fn matches_fragment(identity: &Identity, needle: &str) -> bool {
    identity.handle.as_ref().to_lowercase().contains(needle)
        || identity.name.as_ref().to_lowercase().contains(needle)
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, identity: &NewIdentity) -> Result<Identity, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&identity.handle) {
            return Err(CredentialStoreError::duplicate_handle(
                identity.handle.as_ref(),
            ));
        }
        if email_taken(&accounts, &identity.email, None) {
            return Err(CredentialStoreError::duplicate_email(
                identity.email.as_ref(),
            ));
        }
        let record = identity.clone().into_identity();
        accounts.insert(record.handle.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_handle(
        &self,
        handle: &Handle,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        Ok(self.accounts.read().await.get(handle).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| &account.email == email)
            .cloned())
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Identity>, CredentialStoreError> {
        let needle = fragment.to_lowercase();
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|account| matches_fragment(account, &needle))
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        handle: &Handle,
        update: &ProfileUpdate,
    ) -> Result<Option<Identity>, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(handle) {
            return Ok(None);
        }
        if email_taken(&accounts, &update.email, Some(handle)) {
            return Err(CredentialStoreError::duplicate_email(update.email.as_ref()));
        }
        Ok(accounts.get_mut(handle).map(|account| {
            account.name = update.name.clone();
            account.email = update.email.clone();
            account.updated_at = update.updated_at;
            account.clone()
        }))
    }

    async fn update_password_hash(
        &self,
        handle: &Handle,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        Ok(match accounts.get_mut(handle) {
            Some(account) => {
                account.password_hash = hash.clone();
                account.updated_at = updated_at;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, handle: &Handle) -> Result<bool, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.remove(handle).is_none() {
            return Ok(false);
        }
        for account in accounts.values_mut() {
            account.followers.remove(handle);
            account.following.remove(handle);
        }
        Ok(true)
    }

    async fn apply_follow_edge(
        &self,
        edge: &FollowEdge,
        op: EdgeOp,
    ) -> Result<EdgeOutcome, CredentialStoreError> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&edge.follower) || !accounts.contains_key(&edge.followed) {
            return Ok(EdgeOutcome::MissingAccount);
        }

        let changed = match (op, accounts.get_mut(&edge.follower)) {
            (EdgeOp::Add, Some(follower)) => follower.following.insert(edge.followed.clone()),
            (EdgeOp::Remove, Some(follower)) => follower.following.remove(&edge.followed),
            (_, None) => false,
        };
        if !changed {
            return Ok(EdgeOutcome::Unchanged);
        }
        if let Some(followed) = accounts.get_mut(&edge.followed) {
            match op {
                EdgeOp::Add => followed.followers.insert(edge.follower.clone()),
                EdgeOp::Remove => followed.followers.remove(&edge.follower),
            };
        }
        Ok(EdgeOutcome::Applied)
    }
}
