//! Selection of the store adapters backing the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use agora_backend::inbound::http::state::{HttpState, HttpStatePorts};
use agora_backend::outbound::memory::{InMemoryCredentialStore, InMemoryPostStore};
use agora_backend::outbound::persistence::{DieselCredentialStore, DieselPostStore};

use super::ServerConfig;

/// Use `make_ports` when a pool is available, otherwise the in-memory stores.
fn build_store_ports_with_pool<Pool>(
    pool: &Option<Pool>,
    make_ports: impl FnOnce(&Pool) -> HttpStatePorts,
) -> HttpStatePorts {
    match pool {
        Some(pool) => make_ports(pool),
        None => HttpStatePorts {
            credentials: Arc::new(InMemoryCredentialStore::new()),
            posts: Arc::new(InMemoryPostStore::new()),
        },
    }
}

fn build_store_ports(config: &ServerConfig) -> HttpStatePorts {
    if config.db_pool.is_some() {
        info!("using PostgreSQL stores");
    } else {
        warn!("no database configured; using in-memory stores (data is lost on exit)");
    }
    build_store_ports_with_pool(&config.db_pool, |pool| HttpStatePorts {
        credentials: Arc::new(DieselCredentialStore::new(pool.clone())),
        posts: Arc::new(DieselPostStore::new(pool.clone())),
    })
}

/// Build the shared HTTP state from the configured stores.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = build_store_ports(config);
    web::Data::new(HttpState::new(
        ports,
        config.tokens.clone(),
        config.clock.clone(),
    ))
}
