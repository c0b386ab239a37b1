//! Cinema backend library modules.
//!
//! Two deployables share this crate: `cinema-app` (movies, tickets and the
//! replicated client accounts) and `cinema-users` (authoritative accounts
//! originating the client lifecycle saga).

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use domain::TraceId;
pub use middleware::Trace;
