//! Account lifecycle: registration, login, lookup, and profile management.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::authorization::require_owner;
use crate::domain::password::PasswordHasher;
use crate::domain::ports::{CredentialStore, PostStore};
use crate::domain::store_errors::{map_credential_store_error, map_post_store_error};
use crate::domain::token::{BearerToken, TokenService};
use crate::domain::{
    DisplayName, EmailAddress, Error, Handle, Identity, LoginCredentials, NewIdentity,
    ProfileUpdate, Registration,
};

/// Successful login payload.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// Handle that logged in.
    pub handle: Handle,
    /// Freshly issued bearer token.
    pub token: BearerToken,
}

/// Account use-cases.
#[derive(Clone)]
pub struct AccountService {
    credentials: Arc<dyn CredentialStore>,
    posts: Arc<dyn PostStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Wire the service to its stores, hasher, token issuer and clock.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        posts: Arc<dyn PostStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            posts,
            hasher,
            tokens,
            clock,
        }
    }

    /// Create an account. Duplicate handles or emails are `conflict`.
    pub async fn register(&self, registration: &Registration) -> Result<Identity, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let new_identity = NewIdentity {
            handle: registration.handle().clone(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            password_hash,
            created_at: self.clock.utc(),
        };
        let identity = self
            .credentials
            .create(&new_identity)
            .await
            .map_err(map_credential_store_error)?;
        info!(handle = %identity.handle, "account registered");
        Ok(identity)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Unknown emails and wrong passwords fail identically so callers cannot
    /// probe which addresses are registered.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginSession, Error> {
        let identity = self
            .credentials
            .find_by_email(credentials.email())
            .await
            .map_err(map_credential_store_error)?;
        let Some(identity) = identity else {
            return Err(invalid_credentials());
        };
        if self
            .hasher
            .verify(&identity.password_hash, credentials.password())
            .is_err()
        {
            warn!(handle = %identity.handle, "login rejected");
            return Err(invalid_credentials());
        }

        let token = self
            .tokens
            .issue(&identity.handle)
            .map_err(|err| Error::internal(err.to_string()))?;
        info!(handle = %identity.handle, "login succeeded");
        Ok(LoginSession {
            handle: identity.handle,
            token,
        })
    }

    /// Fetch one account.
    pub async fn get(&self, handle: &Handle) -> Result<Identity, Error> {
        self.credentials
            .find_by_handle(handle)
            .await
            .map_err(map_credential_store_error)?
            .ok_or_else(|| Error::not_found(format!("account {handle} not found")))
    }

    /// Accounts whose handle or name contains `fragment`.
    pub async fn search(&self, fragment: &str) -> Result<Vec<Identity>, Error> {
        self.credentials
            .search(fragment.trim())
            .await
            .map_err(map_credential_store_error)
    }

    /// Change name and email of the caller's own account.
    pub async fn update_profile(
        &self,
        caller: &Handle,
        handle: &Handle,
        name: DisplayName,
        email: EmailAddress,
    ) -> Result<Identity, Error> {
        require_owner(caller, handle, "update")?;
        let update = ProfileUpdate {
            name,
            email,
            updated_at: self.clock.utc(),
        };
        self.credentials
            .update_profile(handle, &update)
            .await
            .map_err(map_credential_store_error)?
            .ok_or_else(|| Error::not_found(format!("account {handle} not found")))
    }

    /// Delete the caller's own account, its follow edges, and its posts.
    pub async fn delete_account(&self, caller: &Handle, handle: &Handle) -> Result<(), Error> {
        require_owner(caller, handle, "delete")?;
        // Posts go first so a failed cleanup leaves the account in place to retry.
        let removed_posts = self
            .posts
            .delete_by_author(handle)
            .await
            .map_err(map_post_store_error)?;
        let deleted = self
            .credentials
            .delete(handle)
            .await
            .map_err(map_credential_store_error)?;
        if !deleted {
            return Err(Error::not_found(format!("account {handle} not found")));
        }
        info!(handle = %handle, removed_posts, "account deleted");
        Ok(())
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}
