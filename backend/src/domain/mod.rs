//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed domain entities and the use-case services
//! that operate on them. Services depend only on the driven ports in
//! [`ports`]; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Handle, Identity, Post and friends: validated values and records.
//! - AccountService, PostService, SocialGraphService, EngagementService:
//!   use-cases consumed by inbound adapters.
//! - TokenService, AuthorizationGuard, PasswordHasher: authentication core.

pub mod accounts;
pub mod auth;
pub mod authorization;
pub mod engagement;
pub mod error;
pub mod password;
pub mod ports;
pub mod post;
pub mod posts;
pub mod social_graph;
mod store_errors;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::accounts::{AccountService, LoginSession};
pub use self::auth::{LoginCredentials, Registration};
pub use self::authorization::{AuthorizationGuard, require_owner};
pub use self::engagement::EngagementService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::{PasswordError, PasswordHasher};
pub use self::post::{LikeDelta, Post, PostDraft, PostId, PostValidationError};
pub use self::posts::PostService;
pub use self::social_graph::SocialGraphService;
pub use self::token::{AuthSecret, BearerToken, TokenError, TokenService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, EmailAddress, Handle, Identity, NewIdentity, PasswordHash, ProfileUpdate,
    UserValidationError,
};

