//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_store;
mod post_store;

#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{
    CredentialStore, CredentialStoreError, EdgeOp, EdgeOutcome, FollowEdge,
};
#[cfg(test)]
pub use post_store::MockPostStore;
pub use post_store::{PostStore, PostStoreError};
