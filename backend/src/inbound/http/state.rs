//! Shared HTTP adapter state.
//!
//! HTTP handlers accept these bundles via `actix_web::web::Data` so they only
//! depend on domain ports (use cases) and remain testable without I/O. Both
//! deployables register [`HttpState`]; only the app registers
//! [`CinemaState`].

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, MovieCommand, MovieQuery, ResourceSigner, TicketCommand, TicketQuery,
    TokenVerifier, UserAccountCommand, UserAccountQuery,
};

/// Parameter object bundling the account and credential ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub accounts_query: Arc<dyn UserAccountQuery>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub signer: Arc<dyn ResourceSigner>,
}

/// Dependency bundle for authentication and account handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub accounts_query: Arc<dyn UserAccountQuery>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub signer: Arc<dyn ResourceSigner>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            accounts_query,
            tokens,
            signer,
        } = ports;
        Self {
            login,
            accounts,
            accounts_query,
            tokens,
            signer,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

/// Dependency bundle for the movie and ticket handlers.
#[derive(Clone)]
pub struct CinemaState {
    pub movies: Arc<dyn MovieCommand>,
    pub movies_query: Arc<dyn MovieQuery>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
}
