//! Mapping from storage port failures to domain errors.
//!
//! Store failures surface as `storage_unavailable` unless they correspond to
//! a domain condition such as a duplicate unique field.

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{CredentialStoreError, PostStoreError};

pub(crate) fn map_credential_store_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => {
            Error::storage_unavailable(format!("credential store unavailable: {message}"))
        }
        CredentialStoreError::Query { message } => {
            Error::storage_unavailable(format!("credential store error: {message}"))
        }
        CredentialStoreError::DuplicateHandle { handle } => {
            Error::conflict(format!("handle {handle} is already registered"))
                .with_details(json!({ "field": "handle" }))
        }
        CredentialStoreError::DuplicateEmail { .. } => {
            Error::conflict("email address is already registered")
                .with_details(json!({ "field": "email" }))
        }
    }
}

pub(crate) fn map_post_store_error(error: PostStoreError) -> Error {
    match error {
        PostStoreError::Connection { message } => {
            Error::storage_unavailable(format!("post store unavailable: {message}"))
        }
        PostStoreError::Query { message } => {
            Error::storage_unavailable(format!("post store error: {message}"))
        }
    }
}
