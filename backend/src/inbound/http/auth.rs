//! Bearer token extraction for protected handlers.
//!
//! Handlers that need a caller take an [`AuthenticatedUser`] argument; the
//! extractor resolves it through the [`AuthorizationGuard`] held in
//! [`HttpState`], so a missing or invalid token fails with `401` before the
//! handler body runs.
//!
//! [`AuthorizationGuard`]: crate::domain::AuthorizationGuard

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use crate::domain::{Error, Handle};

use super::state::HttpState;

/// Caller resolved from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(Handle);

impl AuthenticatedUser {
    /// Handle of the authenticated caller.
    pub fn handle(&self) -> &Handle {
        &self.0
    }

    /// Unwrap the caller's handle.
    pub fn into_inner(self) -> Handle {
        self.0
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| Error::unauthorized("authorization header is not valid text"))?,
        ),
        None => None,
    };
    state.guard.resolve_caller(header).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
