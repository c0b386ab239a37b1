//! Driven port for ticket persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Ticket, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ticket persistence adapters.
    pub enum TicketRepositoryError {
        Connection { message: String } => "ticket repository connection failed: {message}",
        Query { message: String } => "ticket repository query failed: {message}",
        NotFound { id: Uuid } => "ticket {id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Ticket>, TicketRepositoryError>;

    async fn find_all(&self) -> Result<Vec<Ticket>, TicketRepositoryError>;

    async fn find_by_client(&self, client_id: &UserId)
    -> Result<Vec<Ticket>, TicketRepositoryError>;

    async fn find_by_movie(&self, movie_id: &Uuid) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Number of tickets sold for a movie.
    async fn count_by_movie(&self, movie_id: &Uuid) -> Result<u64, TicketRepositoryError>;

    /// Replace a stored ticket; `NotFound` when absent.
    async fn update(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    async fn delete(&self, id: &Uuid) -> Result<(), TicketRepositoryError>;
}
