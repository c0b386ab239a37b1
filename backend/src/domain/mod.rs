//! Domain primitives, aggregates and use cases.
//!
//! Purpose: define the strongly typed entities shared by both deployables
//! and the services behind the driving ports. Types validate on
//! construction and document their invariants in Rustdoc; serialisation
//! contracts for the wire live in the inbound and outbound adapters.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Movie, Ticket, User: aggregates with their validated value types.
//! - ClientSyncMessage / SyncStep: client lifecycle saga messages.
//! - ResourceTag: identity covered by `ETag`/`If-Match`.
//! - TraceId: request-scoped correlation id.
//! - Services implementing the ports in [`ports`].

pub mod auth;
pub mod authentication_service;
pub mod client_sync;
pub mod client_sync_service;
pub mod error;
pub mod movie;
pub mod movie_service;
pub mod ports;
pub mod resource_tag;
pub mod ticket;
pub mod ticket_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{
    AccessClaims, AccessToken, LoginCredentials, LoginValidationError, PlainPassword,
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
pub use self::authentication_service::AuthenticationService;
pub use self::client_sync::{ClientCreateMessage, ClientIdMessage, ClientSyncMessage, SyncStep};
pub use self::client_sync_service::{ClientCompensationService, ClientReplicaService};
pub use self::error::{Error, ErrorCode};
pub use self::movie::{
    Movie, MovieDraft, MovieValidationError, BASE_PRICE_MAX, SCREENING_ROOM_MAX, SEATS_MAX,
    TITLE_MAX_LEN,
};
pub use self::movie_service::MovieService;
pub use self::resource_tag::{ResourceKind, ResourceTag};
pub use self::ticket::{Ticket, TicketValidationError};
pub use self::ticket_service::TicketService;
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::user::{
    Login, PasswordHash, User, UserId, UserRole, UserValidationError, LOGIN_MAX_LEN,
    LOGIN_MIN_LEN,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use cinema::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("staff only"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
