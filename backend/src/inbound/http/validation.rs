//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain validation failures become `invalid_request` errors whose details
//! name the offending field and a stable machine-readable code.

use actix_web::{HttpRequest, error::JsonPayloadError, web};
use serde_json::json;

use crate::domain::{Error, Handle, PostId, PostValidationError, UserValidationError};

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Map account value validation failures onto request errors.
pub fn map_user_validation_error(err: UserValidationError) -> Error {
    let message = err.to_string();
    let (field, code) = match err {
        UserValidationError::EmptyHandle => ("handle", "empty_handle"),
        UserValidationError::HandleTooLong { .. } => ("handle", "handle_too_long"),
        UserValidationError::HandleInvalidCharacters => ("handle", "invalid_handle"),
        UserValidationError::EmptyDisplayName => ("name", "empty_name"),
        UserValidationError::DisplayNameTooLong { .. } => ("name", "name_too_long"),
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::EmptyPassword => ("password", "empty_password"),
    };
    field_error(field, code, message)
}

/// Map post validation failures onto request errors.
pub fn map_post_validation_error(err: PostValidationError) -> Error {
    let message = err.to_string();
    let (field, code) = match err {
        PostValidationError::EmptyTitle => ("title", "empty_title"),
        PostValidationError::EmptyContent => ("content", "empty_content"),
        PostValidationError::InvalidId => ("id", "invalid_uuid"),
    };
    field_error(field, code, message)
}

/// Parse a handle taken from the request path.
pub fn parse_handle(raw: &str) -> Result<Handle, Error> {
    Handle::new(raw).map_err(map_user_validation_error)
}

/// Parse a post identifier taken from the request path.
pub fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    PostId::parse(raw).map_err(map_post_validation_error)
}

/// JSON extractor configuration that reports body errors in the error schema.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    field_error("body", "invalid_json", format!("invalid request body: {err}")).into()
}
