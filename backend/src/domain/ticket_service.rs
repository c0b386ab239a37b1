//! Ticket use cases.
//!
//! Selling a ticket checks the buyer and the movie through their own
//! repositories and prices the ticket from the movie at the time of sale.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    IssueTicketRequest, MovieRepository, MovieRepositoryError, TicketCommand, TicketQuery,
    TicketRepository, TicketRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, Ticket, UserId, UserRole};

fn map_ticket_error(error: TicketRepositoryError) -> Error {
    match error {
        TicketRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketRepositoryError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
        TicketRepositoryError::NotFound { id } => {
            Error::not_found(format!("ticket {id} not found"))
        }
    }
}

fn map_movie_error(error: MovieRepositoryError) -> Error {
    match error {
        MovieRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("movie repository unavailable: {message}"))
        }
        MovieRepositoryError::NotFound { id } => Error::not_found(format!("movie {id} not found")),
        other => Error::internal(format!("movie lookup failed: {other}")),
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::NotFound { id } => Error::not_found(format!("client {id} not found")),
        other => Error::internal(format!("client lookup failed: {other}")),
    }
}

/// Ticket service implementing [`TicketCommand`] and [`TicketQuery`].
#[derive(Clone)]
pub struct TicketService<T, M, U> {
    tickets: Arc<T>,
    movies: Arc<M>,
    users: Arc<U>,
}

impl<T, M, U> TicketService<T, M, U> {
    pub fn new(tickets: Arc<T>, movies: Arc<M>, users: Arc<U>) -> Self {
        Self {
            tickets,
            movies,
            users,
        }
    }
}

impl<T, M, U> TicketService<T, M, U>
where
    T: TicketRepository,
    M: MovieRepository,
    U: UserRepository,
{
    async fn require_active_client(&self, client_id: UserId) -> Result<(), Error> {
        let client = self
            .users
            .find_by_id(UserRole::Client, &client_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("client {client_id} not found")))?;
        if client.is_active() {
            Ok(())
        } else {
            Err(Error::invalid_request(format!("client {client_id} is not active"))
                .with_details(json!({ "field": "clientId", "code": "client_inactive" })))
        }
    }

    async fn load(&self, id: Uuid) -> Result<Ticket, Error> {
        self.tickets
            .find_by_id(&id)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| Error::not_found(format!("ticket {id} not found")))
    }
}

#[async_trait]
impl<T, M, U> TicketCommand for TicketService<T, M, U>
where
    T: TicketRepository,
    M: MovieRepository,
    U: UserRepository,
{
    async fn create(&self, request: IssueTicketRequest) -> Result<Ticket, Error> {
        let IssueTicketRequest {
            movie_time,
            client_id,
            movie_id,
        } = request;

        self.require_active_client(client_id).await?;
        let movie = self
            .movies
            .find_by_id(&movie_id)
            .await
            .map_err(map_movie_error)?
            .ok_or_else(|| Error::not_found(format!("movie {movie_id} not found")))?;

        let sold = self
            .tickets
            .count_by_movie(&movie_id)
            .await
            .map_err(map_ticket_error)?;
        if sold >= u64::from(movie.available_seats()) {
            return Err(Error::conflict(format!("movie {movie_id} is sold out"))
                .with_details(json!({ "code": "sold_out" })));
        }

        let ticket = Ticket::issue(Uuid::new_v4(), movie_time, client_id, &movie);
        self.tickets
            .create(&ticket)
            .await
            .map_err(map_ticket_error)?;
        info!(ticket_id = %ticket.id(), %client_id, %movie_id, "ticket sold");
        Ok(ticket)
    }

    async fn reschedule(&self, id: Uuid, movie_time: DateTime<Utc>) -> Result<Ticket, Error> {
        let mut ticket = self.load(id).await?;
        ticket.reschedule(movie_time);
        self.tickets
            .update(&ticket)
            .await
            .map_err(map_ticket_error)?;
        Ok(ticket)
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.tickets.delete(&id).await.map_err(map_ticket_error)
    }
}

#[async_trait]
impl<T, M, U> TicketQuery for TicketService<T, M, U>
where
    T: TicketRepository,
    M: MovieRepository,
    U: UserRepository,
{
    async fn find(&self, id: Uuid) -> Result<Ticket, Error> {
        self.load(id).await
    }

    async fn find_all(&self) -> Result<Vec<Ticket>, Error> {
        self.tickets.find_all().await.map_err(map_ticket_error)
    }

    async fn find_for_client(&self, client_id: UserId) -> Result<Vec<Ticket>, Error> {
        self.tickets
            .find_by_client(&client_id)
            .await
            .map_err(map_ticket_error)
    }

    async fn find_for_movie(&self, movie_id: Uuid) -> Result<Vec<Ticket>, Error> {
        self.tickets
            .find_by_movie(&movie_id)
            .await
            .map_err(map_ticket_error)
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
