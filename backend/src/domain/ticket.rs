//! Tickets sold for a movie screening.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Movie, UserId};

/// Validation errors raised when building a [`Ticket`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TicketValidationError {
    #[error("ticket price must be a non-negative number, got {value}")]
    InvalidPrice { value: f64 },
}

/// A ticket bought by a client for one movie.
///
/// ## Invariants
/// - `price` is finite and non-negative.
/// - `client_id` and `movie_id` always reference an account and a movie that
///   existed when the ticket was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    id: Uuid,
    movie_time: DateTime<Utc>,
    price: f64,
    client_id: UserId,
    movie_id: Uuid,
}

impl Ticket {
    /// Issue a ticket priced at the movie's base price.
    #[must_use]
    pub fn issue(id: Uuid, movie_time: DateTime<Utc>, client_id: UserId, movie: &Movie) -> Self {
        Self {
            id,
            movie_time,
            price: movie.base_price(),
            client_id,
            movie_id: movie.id(),
        }
    }

    /// Rebuild a stored ticket.
    pub fn restore(
        id: Uuid,
        movie_time: DateTime<Utc>,
        price: f64,
        client_id: UserId,
        movie_id: Uuid,
    ) -> Result<Self, TicketValidationError> {
        if !price.is_finite() || price < 0.0 {
            return Err(TicketValidationError::InvalidPrice { value: price });
        }
        Ok(Self {
            id,
            movie_time,
            price,
            client_id,
            movie_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn movie_time(&self) -> DateTime<Utc> {
        self.movie_time
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[must_use]
    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    #[must_use]
    pub fn movie_id(&self) -> Uuid {
        self.movie_id
    }

    /// Move the ticket to another screening time.
    pub fn reschedule(&mut self, movie_time: DateTime<Utc>) {
        self.movie_time = movie_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieDraft;
    use chrono::TimeZone;
    use rstest::rstest;

    fn movie(price: f64) -> Movie {
        Movie::new(MovieDraft {
            id: Uuid::new_v4(),
            title: "Rashomon".to_owned(),
            base_price: price,
            screening_room: 2,
            available_seats: 10,
        })
        .expect("valid movie")
    }

    #[test]
    fn issue_copies_movie_price_and_reference() {
        let movie = movie(32.5);
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).single().expect("time");
        let client = UserId::random();
        let ticket = Ticket::issue(Uuid::new_v4(), at, client, &movie);

        assert_eq!(ticket.price(), 32.5);
        assert_eq!(ticket.movie_id(), movie.id());
        assert_eq!(ticket.client_id(), client);
        assert_eq!(ticket.movie_time(), at);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn restore_rejects_invalid_prices(#[case] price: f64) {
        let result = Ticket::restore(Uuid::nil(), Utc::now(), price, UserId::random(), Uuid::nil());
        assert!(matches!(
            result,
            Err(TicketValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn reschedule_only_changes_time() {
        let movie = movie(10.0);
        let mut ticket = Ticket::issue(Uuid::new_v4(), Utc::now(), UserId::random(), &movie);
        let before = ticket.clone();
        let later = before.movie_time() + chrono::Duration::hours(2);
        ticket.reschedule(later);

        assert_eq!(ticket.movie_time(), later);
        assert_eq!(ticket.price(), before.price());
        assert_eq!(ticket.id(), before.id());
    }
}
