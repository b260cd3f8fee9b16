//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use agora_backend::domain::TokenService;
use agora_backend::outbound::persistence::DbPool;
use mockable::Clock;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: Arc<TokenService>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration around the token service.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: Arc<TokenService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bind_addr,
            tokens,
            clock,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the server uses the PostgreSQL stores; otherwise the
    /// in-memory stores back every request.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
