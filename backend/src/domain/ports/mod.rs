//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens, broker publishing) are
//! implemented by `outbound` adapters; driving ports (use cases) are
//! implemented by domain services and called by `inbound` adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod client_sync_handler;
mod client_sync_publisher;
mod login_service;
mod movie_command;
mod movie_query;
mod movie_repository;
mod password_hasher;
mod resource_signer;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod token_service;
mod user_account_command;
mod user_account_query;
mod user_repository;

#[cfg(test)]
pub use client_sync_handler::MockClientSyncHandler;
pub use client_sync_handler::{ClientSyncHandler, SyncOutcome};
#[cfg(test)]
pub use client_sync_publisher::MockClientSyncPublisher;
pub use client_sync_publisher::{
    ClientSyncPublishError, ClientSyncPublisher, NoOpClientSyncPublisher,
};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use movie_command::MovieCommand;
#[cfg(test)]
pub use movie_command::MockMovieCommand;
pub use movie_query::MovieQuery;
#[cfg(test)]
pub use movie_query::MockMovieQuery;
#[cfg(test)]
pub use movie_repository::MockMovieRepository;
pub use movie_repository::{MovieRepository, MovieRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use resource_signer::MockResourceSigner;
pub use resource_signer::{FixtureResourceSigner, ResourceSigner, SignatureError};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::{IssueTicketRequest, TicketCommand};
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::TicketQuery;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketRepository, TicketRepositoryError};
#[cfg(test)]
pub use token_service::{MockTokenIssuer, MockTokenVerifier};
pub use token_service::{FixtureTokenVerifier, TokenError, TokenIssuer, TokenVerifier};
#[cfg(test)]
pub use user_account_command::MockUserAccountCommand;
pub use user_account_command::{AccountUpdate, NewAccount, UserAccountCommand};
#[cfg(test)]
pub use user_account_query::MockUserAccountQuery;
pub use user_account_query::UserAccountQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
