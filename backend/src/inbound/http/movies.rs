//! Movie programme handlers.
//!
//! ```text
//! POST   /movies            {"title":"Stalker","basePrice":25.0,"scrRoomNumber":3,"numberOfAvailableSeats":80}
//! GET    /movies
//! GET    /movies/{id}
//! GET    /movies/{id}/tickets
//! PUT    /movies/update     If-Match: "<etag>"
//! DELETE /movies/{id}
//! ```

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Scope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Movie, MovieDraft, ResourceTag, UserRole};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::if_match::{require_if_match, tagged_json};
use crate::inbound::http::state::{CinemaState, HttpState};
use crate::inbound::http::tickets::TicketResponse;
use crate::inbound::http::validation::{missing_field_error, parse_uuid, FieldName};
use crate::inbound::http::{list_response, ApiResult};

const ID: FieldName = FieldName::new("id");
const TICKET_VIEWERS: [UserRole; 2] = [UserRole::Staff, UserRole::Admin];

/// Movie payload; `id` is only read by updates.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub base_price: f64,
    pub scr_room_number: u32,
    pub number_of_available_seats: u32,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: String,
    pub title: String,
    pub base_price: f64,
    pub scr_room_number: u32,
    pub number_of_available_seats: u32,
}

impl From<&Movie> for MovieResponse {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id().to_string(),
            title: movie.title().to_owned(),
            base_price: movie.base_price(),
            scr_room_number: movie.screening_room(),
            number_of_available_seats: movie.available_seats(),
        }
    }
}

fn draft(id: Uuid, payload: MovieRequest) -> MovieDraft {
    MovieDraft {
        id,
        title: payload.title,
        base_price: payload.base_price,
        screening_room: payload.scr_room_number,
        available_seats: payload.number_of_available_seats,
    }
}

/// Add a movie to the programme.
#[post("")]
pub async fn create_movie(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    payload: web::Json<MovieRequest>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Staff)?;
    let draft = draft(Uuid::new_v4(), payload.into_inner());
    let movie = cinema.movies.create(draft).await?;
    Ok(HttpResponse::Created().json(MovieResponse::from(&movie)))
}

#[get("")]
pub async fn list_movies(
    cinema: web::Data<CinemaState>,
    _auth: Authenticated,
) -> ApiResult<HttpResponse> {
    let movies = cinema.movies_query.find_all().await?;
    Ok(list_response(movies.iter().map(MovieResponse::from)))
}

/// Replace a movie. The `If-Match` tag must name the payload's id.
#[put("/update")]
pub async fn update_movie(
    req: HttpRequest,
    state: web::Data<HttpState>,
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    payload: web::Json<MovieRequest>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Staff)?;
    let mut payload = payload.into_inner();
    let raw_id = payload.id.take().ok_or_else(|| missing_field_error(ID))?;
    let id = parse_uuid(&raw_id, ID)?;
    let draft = draft(id, payload);
    require_if_match(&req, state.signer.as_ref(), &ResourceTag::movie(id))?;
    cinema.movies.update(draft).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{id}")]
pub async fn movie_by_id(
    state: web::Data<HttpState>,
    cinema: web::Data<CinemaState>,
    _auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), ID)?;
    let movie = cinema.movies_query.find(id).await?;
    tagged_json(
        state.signer.as_ref(),
        &ResourceTag::movie(movie.id()),
        &MovieResponse::from(&movie),
    )
}

#[get("/{id}/tickets")]
pub async fn movie_tickets(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_any(&TICKET_VIEWERS)?;
    let id = parse_uuid(&path.into_inner(), ID)?;
    let tickets = cinema.tickets_query.find_for_movie(id).await?;
    Ok(list_response(tickets.iter().map(TicketResponse::from)))
}

/// Remove a movie; refused while tickets reference it.
#[delete("/{id}")]
pub async fn delete_movie(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Staff)?;
    let id = parse_uuid(&path.into_inner(), ID)?;
    cinema.movies.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn movie_scope() -> Scope {
    web::scope("/movies")
        .service(create_movie)
        .service(list_movies)
        .service(update_movie)
        .service(movie_by_id)
        .service(movie_tickets)
        .service(delete_movie)
}

#[cfg(test)]
#[path = "movies_tests.rs"]
mod tests;
