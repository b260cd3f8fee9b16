//! Shared helpers for integration suites that run against embedded
//! PostgreSQL.
//!
//! Integration tests compile as separate crates, so each suite that needs a
//! database declares `mod support;` and pulls these helpers in.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster_handle};
