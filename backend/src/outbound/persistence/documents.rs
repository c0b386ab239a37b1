//! Stored document shapes.
//!
//! Identifiers are stored as hyphenated UUID strings in `_id`. User
//! documents carry the role in the `_clazz` discriminator so all three
//! account kinds share the `users` collection and its unique login index.

use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Login, Movie, MovieDraft, PasswordHash, Ticket, User, UserId, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MovieDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub base_price: f64,
    pub scr_room_number: i32,
    pub number_of_available_seats: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TicketDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub movie_time: bson::DateTime,
    pub price: f64,
    pub client_id: String,
    pub movie_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_clazz")]
    pub role: UserRole,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub active: bool,
}

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|err| format!("stored {field} {raw} is not a UUID: {err}"))
}

fn to_stored_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn from_stored_int(value: i32, field: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("stored {field} {value} is negative"))
}

impl From<&Movie> for MovieDocument {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id().to_string(),
            title: movie.title().to_owned(),
            base_price: movie.base_price(),
            scr_room_number: to_stored_int(movie.screening_room()),
            number_of_available_seats: to_stored_int(movie.available_seats()),
        }
    }
}

impl TryFrom<MovieDocument> for Movie {
    type Error = String;

    fn try_from(document: MovieDocument) -> Result<Self, Self::Error> {
        Movie::new(MovieDraft {
            id: parse_uuid(&document.id, "movie id")?,
            title: document.title,
            base_price: document.base_price,
            screening_room: from_stored_int(document.scr_room_number, "screening room")?,
            available_seats: from_stored_int(document.number_of_available_seats, "seat count")?,
        })
        .map_err(|err| format!("stored movie is invalid: {err}"))
    }
}

impl From<&Ticket> for TicketDocument {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id().to_string(),
            movie_time: bson::DateTime::from_millis(ticket.movie_time().timestamp_millis()),
            price: ticket.price(),
            client_id: ticket.client_id().to_string(),
            movie_id: ticket.movie_id().to_string(),
        }
    }
}

impl TryFrom<TicketDocument> for Ticket {
    type Error = String;

    fn try_from(document: TicketDocument) -> Result<Self, Self::Error> {
        let millis = document.movie_time.timestamp_millis();
        let movie_time = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| format!("stored movie time {millis} is out of range"))?;
        Ticket::restore(
            parse_uuid(&document.id, "ticket id")?,
            movie_time,
            document.price,
            UserId::from(parse_uuid(&document.client_id, "client id")?),
            parse_uuid(&document.movie_id, "movie id")?,
        )
        .map_err(|err| format!("stored ticket is invalid: {err}"))
    }
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            role: user.role(),
            login: user.login().as_str().to_owned(),
            password: user.password().map(|hash| hash.as_str().to_owned()),
            active: user.is_active(),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = String;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        let id = UserId::from(parse_uuid(&document.id, "user id")?);
        let login = Login::new(document.login)
            .map_err(|err| format!("stored login of user {id} is invalid: {err}"))?;
        Ok(User::restore(
            id,
            login,
            document.password.map(PasswordHash::new),
            document.active,
            document.role,
        ))
    }
}
