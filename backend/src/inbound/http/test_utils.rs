//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{
    FixtureResourceSigner, FixtureTokenVerifier, MockLoginService, MockMovieCommand,
    MockMovieQuery, MockTicketCommand, MockTicketQuery, MockUserAccountCommand,
    MockUserAccountQuery, ResourceSigner,
};
use crate::domain::{ResourceTag, UserRole};
use crate::inbound::http::state::{CinemaState, HttpState, HttpStatePorts};

/// Bearer token accepted by [`FixtureTokenVerifier`].
pub(crate) fn token(role: UserRole, id: Uuid, login: &str) -> String {
    FixtureTokenVerifier::token_for(role, id, login)
}

/// `Authorization` header value for a fixture token.
pub(crate) fn bearer(role: UserRole, id: Uuid, login: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(role, id, login)))
}

/// Quoted `ETag`/`If-Match` value for `tag` as the fixture signer emits it.
pub(crate) fn etag(tag: &ResourceTag) -> String {
    let signed = FixtureResourceSigner
        .sign(tag)
        .expect("fixture signer encodes tags");
    format!("\"{signed}\"")
}

/// Mocked account ports; tests set expectations before calling `build`.
#[derive(Default)]
pub(crate) struct AccountMocks {
    pub login: MockLoginService,
    pub accounts: MockUserAccountCommand,
    pub accounts_query: MockUserAccountQuery,
}

impl AccountMocks {
    pub(crate) fn build(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            tokens: Arc::new(FixtureTokenVerifier),
            signer: Arc::new(FixtureResourceSigner),
        })
    }
}

/// Account mocks without expectations; any call panics.
pub(crate) fn fixture_state() -> AccountMocks {
    AccountMocks::default()
}

/// Mocked movie and ticket ports.
#[derive(Default)]
pub(crate) struct CinemaMocks {
    pub movies: MockMovieCommand,
    pub movies_query: MockMovieQuery,
    pub tickets: MockTicketCommand,
    pub tickets_query: MockTicketQuery,
}

impl CinemaMocks {
    pub(crate) fn build(self) -> CinemaState {
        CinemaState {
            movies: Arc::new(self.movies),
            movies_query: Arc::new(self.movies_query),
            tickets: Arc::new(self.tickets),
            tickets_query: Arc::new(self.tickets_query),
        }
    }
}
