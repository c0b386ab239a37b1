//! Driven port for movie persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Movie;

use super::define_port_error;

define_port_error! {
    /// Errors raised by movie persistence adapters.
    pub enum MovieRepositoryError {
        Connection { message: String } => "movie repository connection failed: {message}",
        Query { message: String } => "movie repository query failed: {message}",
        NotFound { id: Uuid } => "movie {id} not found",
        /// Tickets still reference the movie, so it cannot be removed.
        ReferencedByTickets { id: Uuid } => "movie {id} is referenced by existing tickets",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn create(&self, movie: &Movie) -> Result<(), MovieRepositoryError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Movie>, MovieRepositoryError>;

    async fn find_all(&self) -> Result<Vec<Movie>, MovieRepositoryError>;

    /// Replace a stored movie; `NotFound` when absent.
    async fn update(&self, movie: &Movie) -> Result<(), MovieRepositoryError>;

    /// Remove a movie; `ReferencedByTickets` while any ticket points at it.
    async fn delete(&self, id: &Uuid) -> Result<(), MovieRepositoryError>;
}
