//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: MongoDB-backed repositories
//! - **memory**: in-process repositories with the same semantics
//! - **messaging**: RabbitMQ and in-process publishers for the client saga
//! - **security**: password hashing, bearer tokens and entity tag signing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod messaging;
pub mod persistence;
pub mod security;
