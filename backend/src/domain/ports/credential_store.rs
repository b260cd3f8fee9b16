//! Port abstraction for account persistence adapters and their errors.
//!
//! The follow graph is mutated exclusively through
//! [`CredentialStore::apply_follow_edge`]. Adapters must apply both sides of
//! an edge atomically so `following` and `followers` never disagree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, Handle, Identity, NewIdentity, PasswordHash, ProfileUpdate};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by credential store adapters.
    pub enum CredentialStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "credential store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// Another account already uses this handle.
        DuplicateHandle { handle: String } => "handle already registered: {handle}",
        /// Another account already uses this email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Directed follow relationship between two accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowEdge {
    /// Account doing the following.
    pub follower: Handle,
    /// Account being followed.
    pub followed: Handle,
    /// When the mutation was requested; stored as the edge's creation time.
    pub changed_at: DateTime<Utc>,
}

/// Mutation applied to a [`FollowEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOp {
    /// Create the edge.
    Add,
    /// Delete the edge.
    Remove,
}

/// Result of applying a follow edge mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Both follow sets changed.
    Applied,
    /// The edge was already in the requested state; nothing changed.
    Unchanged,
    /// One of the two accounts does not exist.
    MissingAccount,
}

/// Driven port for account records and the follow graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new account.
    ///
    /// Fails with [`CredentialStoreError::DuplicateHandle`] or
    /// [`CredentialStoreError::DuplicateEmail`] when a unique field collides.
    async fn create(&self, identity: &NewIdentity) -> Result<Identity, CredentialStoreError>;

    /// Fetch an account by handle.
    async fn find_by_handle(&self, handle: &Handle)
    -> Result<Option<Identity>, CredentialStoreError>;

    /// Fetch an account by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, CredentialStoreError>;

    /// List accounts whose handle or name contains `fragment`,
    /// case-insensitively, ordered by handle. An empty fragment matches all.
    async fn search(&self, fragment: &str) -> Result<Vec<Identity>, CredentialStoreError>;

    /// Replace the mutable profile fields. Returns `None` when the account
    /// does not exist.
    async fn update_profile(
        &self,
        handle: &Handle,
        update: &ProfileUpdate,
    ) -> Result<Option<Identity>, CredentialStoreError>;

    /// Replace the stored password hash. Returns `false` when the account
    /// does not exist.
    async fn update_password_hash(
        &self,
        handle: &Handle,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, CredentialStoreError>;

    /// Remove an account and every follow edge touching it. Returns `false`
    /// when the account does not exist.
    async fn delete(&self, handle: &Handle) -> Result<bool, CredentialStoreError>;

    /// Atomically add or remove a follow edge on both accounts.
    async fn apply_follow_edge(
        &self,
        edge: &FollowEdge,
        op: EdgeOp,
    ) -> Result<EdgeOutcome, CredentialStoreError>;
}
