//! Backend entry-point: loads settings, resolves the signing secret, and
//! serves the REST API with health probes.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use agora_backend::config::{AppSettings, BuildMode, auth_secret_from_env};
use agora_backend::domain::TokenService;
use agora_backend::inbound::http::health::HealthState;
use agora_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_address().map_err(io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(io::Error::other)?;

    let secret = auth_secret_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(fingerprint = %secret.fingerprint(), "token signing secret loaded");

    let clock = Arc::new(DefaultClock);
    let tokens = Arc::new(TokenService::new(secret, clock.clone(), token_ttl));
    let mut config = ServerConfig::new(bind_addr, tokens, clock);

    if let Some(url) = settings.database_url() {
        run_migrations(url).await.map_err(io::Error::other)?;
        let pool_config = PoolConfig::new(url).with_max_size(settings.db_max_connections());
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| io::Error::other(e.to_string()))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    let server = create_server(health_state, config)?;
    server.await
}
