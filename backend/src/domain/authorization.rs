//! Caller resolution and the single ownership rule.
//!
//! Every protected operation first resolves the caller from the bearer token.
//! Inbound adapters do this once through [`AuthorizationGuard`]; operations
//! then call [`require_owner`] before mutating a resource.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::token::{TokenService, bearer_token};
use super::{Error, Handle};

/// Resolves the authenticated caller before a protected operation runs.
#[derive(Clone)]
pub struct AuthorizationGuard {
    tokens: Arc<TokenService>,
}

impl AuthorizationGuard {
    /// Guard backed by `tokens`.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the caller handle from an `Authorization` header value.
    ///
    /// Any token failure becomes [`Error::unauthorized`].
    pub fn resolve_caller(&self, authorization: Option<&str>) -> Result<Handle, Error> {
        let raw = bearer_token(authorization);
        self.tokens.resolve_subject(raw).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            Error::unauthorized(err.to_string())
        })
    }

    /// Resolve the caller, then run `operation` with it.
    ///
    /// The operation is never invoked when resolution fails.
    ///
    /// ```rust,no_run
    /// # use agora_backend::domain::{Error, Handle};
    /// # use agora_backend::domain::authorization::AuthorizationGuard;
    /// # async fn example(guard: AuthorizationGuard) -> Result<(), Error> {
    /// let handle = guard
    ///     .protect(Some("Bearer token"), |caller: Handle| async move { Ok(caller) })
    ///     .await?;
    /// println!("caller is {handle}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn protect<T, F, Fut>(
        &self,
        authorization: Option<&str>,
        operation: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(Handle) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let caller = self.resolve_caller(authorization)?;
        operation(caller).await
    }
}

/// Fail with [`Error::forbidden`] unless `caller` owns the resource.
pub fn require_owner(caller: &Handle, owner: &Handle, action: &str) -> Result<(), Error> {
    if caller == owner {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "{caller} may not {action} a resource owned by {owner}"
        )))
    }
}
