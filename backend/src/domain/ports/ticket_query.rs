//! Driving port for ticket reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Ticket, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Ticket, Error>;

    async fn find_all(&self) -> Result<Vec<Ticket>, Error>;

    async fn find_for_client(&self, client_id: UserId) -> Result<Vec<Ticket>, Error>;

    async fn find_for_movie(&self, movie_id: Uuid) -> Result<Vec<Ticket>, Error>;
}
