//! Process-local adapters for the store ports.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. Every mutation takes a single write lock, so a follow edge and a
//! like adjustment are each applied atomically.

mod credential_store;
mod post_store;

pub use credential_store::InMemoryCredentialStore;
pub use post_store::InMemoryPostStore;
