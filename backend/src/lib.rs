//! Agora backend: accounts, follow graph, posts, and likes over HTTP.
//!
//! The crate is laid out hexagonally. [`domain`] holds the validated types,
//! use-case services, and driven ports; [`inbound`] adapts HTTP onto those
//! services; [`outbound`] implements the ports against PostgreSQL or memory.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::Trace;
