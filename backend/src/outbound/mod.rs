//! Outbound adapters implementing the domain's store ports.
//!
//! - **persistence**: PostgreSQL stores using Diesel ORM
//! - **memory**: process-local stores for development and tests
//!
//! Adapters translate between domain records and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
