//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Stores translate between Diesel rows and domain records and hold no
//! business rules. Row structs and table definitions stay private to this
//! module.
//!
//! # Example
//!
//! ```no_run
//! use agora_backend::outbound::persistence::{
//!     DbPool, DieselCredentialStore, PoolConfig, run_migrations,
//! };
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://agora@localhost/agora";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let credentials = DieselCredentialStore::new(pool);
//! # let _ = credentials;
//! # Ok(())
//! # }
//! ```

mod diesel_credential_store;
mod diesel_error_mapping;
mod diesel_post_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_credential_store::DieselCredentialStore;
pub use diesel_post_store::DieselPostStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError};
