//! Application settings loaded via OrthoConfig.
//!
//! Values come from `AGORA_*` environment variables, configuration files, and
//! command-line flags, merged by OrthoConfig. The token lifetime carries an
//! OrthoConfig default so an empty environment still loads; the optional
//! fields fall back in their accessors.

use std::net::SocketAddr;
use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::DEFAULT_MAX_CONNECTIONS;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address '{value}': expected host:port")]
    InvalidBindAddress {
        /// Configured address.
        value: String,
    },
    /// Token lifetime is zero or too large to represent.
    #[error("token lifetime out of range: {value} seconds")]
    InvalidTokenTtl {
        /// Configured lifetime in seconds.
        value: u64,
    },
}

/// Process-wide settings, loaded once at startup.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AGORA")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_address: Option<String>,
    /// PostgreSQL URL. The in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Bearer token lifetime in seconds (six hours by default).
    #[ortho_config(default = 21600)]
    pub token_ttl_secs: u64,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self
            .bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS)
            .trim();
        raw.parse().map_err(|_| SettingsError::InvalidBindAddress {
            value: raw.to_owned(),
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Token lifetime; six hours unless overridden.
    pub fn token_ttl(&self) -> Result<TimeDelta, SettingsError> {
        let value = self.token_ttl_secs;
        i64::try_from(value)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(TimeDelta::try_seconds)
            .ok_or(SettingsError::InvalidTokenTtl { value })
    }

    /// Pool size for the PostgreSQL stores.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }
}
