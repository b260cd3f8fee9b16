//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{CredentialStore, PostStore};
use crate::domain::{
    AccountService, AuthorizationGuard, EngagementService, PasswordHasher, PostService,
    SocialGraphService, TokenService,
};

/// Parameter object bundling the store adapters selected at startup.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Account and follow-edge persistence.
    pub credentials: Arc<dyn CredentialStore>,
    /// Post persistence.
    pub posts: Arc<dyn PostStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and profile use-cases.
    pub accounts: Arc<AccountService>,
    /// Post authoring and reads.
    pub posts: Arc<PostService>,
    /// Follow and unfollow.
    pub social_graph: Arc<SocialGraphService>,
    /// Like counters.
    pub engagement: Arc<EngagementService>,
    /// Bearer token check for protected routes.
    pub guard: AuthorizationGuard,
}

impl HttpState {
    /// Wire the domain services over the supplied stores.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::TimeDelta;
    /// use mockable::DefaultClock;
    /// use agora_backend::domain::{AuthSecret, TokenService};
    /// use agora_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use agora_backend::outbound::memory::{InMemoryCredentialStore, InMemoryPostStore};
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let tokens = Arc::new(TokenService::new(
    ///     AuthSecret::new(vec![9; 32]),
    ///     clock.clone(),
    ///     TimeDelta::hours(6),
    /// ));
    /// let ports = HttpStatePorts {
    ///     credentials: Arc::new(InMemoryCredentialStore::new()),
    ///     posts: Arc::new(InMemoryPostStore::new()),
    /// };
    /// let state = HttpState::new(ports, tokens, clock);
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, tokens: Arc<TokenService>, clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts { credentials, posts } = ports;
        let hasher = PasswordHasher::new();
        Self {
            accounts: Arc::new(AccountService::new(
                credentials.clone(),
                posts.clone(),
                hasher.clone(),
                tokens.clone(),
                clock.clone(),
            )),
            posts: Arc::new(PostService::new(
                posts.clone(),
                credentials.clone(),
                clock.clone(),
            )),
            social_graph: Arc::new(SocialGraphService::new(credentials, hasher, clock)),
            engagement: Arc::new(EngagementService::new(posts)),
            guard: AuthorizationGuard::new(tokens),
        }
    }
}
