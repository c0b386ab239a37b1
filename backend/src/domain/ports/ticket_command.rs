//! Driving port for ticket sales and changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Error, Ticket, UserId};

/// Request to sell a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTicketRequest {
    pub movie_time: DateTime<Utc>,
    pub client_id: UserId,
    pub movie_id: Uuid,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// Sell a ticket to an active client for a movie with free seats.
    async fn create(&self, request: IssueTicketRequest) -> Result<Ticket, Error>;

    /// Move a ticket to another screening time.
    async fn reschedule(&self, id: Uuid, movie_time: DateTime<Utc>) -> Result<Ticket, Error>;

    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}
