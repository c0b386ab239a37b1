//! Ticket handlers.
//!
//! ```text
//! POST   /tickets              {"movieTime":"2026-03-01T18:30:00Z","clientId":"...","movieId":"..."}
//! GET    /tickets
//! GET    /tickets/self
//! GET    /tickets/{id}
//! PUT    /tickets/update       If-Match: "<etag>"
//! DELETE /tickets/{id}
//! GET    /clients/{id}/tickets
//! ```
//!
//! Clients act on their own tickets; staff and admins act on any.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Scope};
use serde::{Deserialize, Serialize};

use crate::domain::ports::IssueTicketRequest;
use crate::domain::{ResourceTag, Ticket, UserRole};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::if_match::{require_if_match, tagged_json};
use crate::inbound::http::state::{CinemaState, HttpState};
use crate::inbound::http::validation::{
    parse_rfc3339_timestamp, parse_user_id, parse_uuid, FieldName,
};
use crate::inbound::http::{list_response, ApiResult};

const ID: FieldName = FieldName::new("id");
const CLIENT_ID: FieldName = FieldName::new("clientId");
const MOVIE_ID: FieldName = FieldName::new("movieId");
const MOVIE_TIME: FieldName = FieldName::new("movieTime");
const BOX_OFFICE: [UserRole; 2] = [UserRole::Staff, UserRole::Admin];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub movie_time: String,
    pub client_id: String,
    pub movie_id: String,
}

/// Body for `PUT /tickets/update`; only the screening time changes.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateRequest {
    pub id: String,
    pub movie_time: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub movie_time: String,
    pub price: f64,
    pub client_id: String,
    pub movie_id: String,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id().to_string(),
            movie_time: ticket.movie_time().to_rfc3339(),
            price: ticket.price(),
            client_id: ticket.client_id().to_string(),
            movie_id: ticket.movie_id().to_string(),
        }
    }
}

fn require_owner_or_box_office(auth: &Authenticated, ticket: &Ticket) -> ApiResult<()> {
    auth.require_self_or(UserRole::Client, ticket.client_id(), &BOX_OFFICE)
}

/// Sell a ticket. Clients may only buy for themselves.
#[post("")]
pub async fn create_ticket(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    payload: web::Json<TicketRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let request = IssueTicketRequest {
        movie_time: parse_rfc3339_timestamp(&payload.movie_time, MOVIE_TIME)?,
        client_id: parse_user_id(&payload.client_id, CLIENT_ID)?,
        movie_id: parse_uuid(&payload.movie_id, MOVIE_ID)?,
    };
    auth.require_self_or(UserRole::Client, request.client_id, &BOX_OFFICE)?;
    let ticket = cinema.tickets.create(request).await?;
    Ok(HttpResponse::Created().json(TicketResponse::from(&ticket)))
}

#[get("")]
pub async fn list_tickets(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    auth.require_any(&BOX_OFFICE)?;
    let tickets = cinema.tickets_query.find_all().await?;
    Ok(list_response(tickets.iter().map(TicketResponse::from)))
}

#[get("/self")]
pub async fn own_tickets(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
) -> ApiResult<HttpResponse> {
    auth.require_role(UserRole::Client)?;
    let tickets = cinema.tickets_query.find_for_client(auth.user_id()).await?;
    Ok(list_response(tickets.iter().map(TicketResponse::from)))
}

/// Move a ticket to another screening time.
#[put("/update")]
pub async fn update_ticket(
    req: HttpRequest,
    state: web::Data<HttpState>,
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    payload: web::Json<TicketUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let id = parse_uuid(&payload.id, ID)?;
    let movie_time = parse_rfc3339_timestamp(&payload.movie_time, MOVIE_TIME)?;
    require_if_match(&req, state.signer.as_ref(), &ResourceTag::ticket(id))?;
    let ticket = cinema.tickets_query.find(id).await?;
    require_owner_or_box_office(&auth, &ticket)?;
    cinema.tickets.reschedule(id, movie_time).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{id}")]
pub async fn ticket_by_id(
    state: web::Data<HttpState>,
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), ID)?;
    let ticket = cinema.tickets_query.find(id).await?;
    require_owner_or_box_office(&auth, &ticket)?;
    tagged_json(
        state.signer.as_ref(),
        &ResourceTag::ticket(ticket.id()),
        &TicketResponse::from(&ticket),
    )
}

#[delete("/{id}")]
pub async fn delete_ticket(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), ID)?;
    let ticket = cinema.tickets_query.find(id).await?;
    require_owner_or_box_office(&auth, &ticket)?;
    cinema.tickets.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Tickets bought by one client.
///
/// Must be registered ahead of the `/clients` account scope, which would
/// otherwise claim the whole prefix.
#[get("/clients/{id}/tickets")]
pub async fn client_tickets(
    cinema: web::Data<CinemaState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let client_id = parse_user_id(&path.into_inner(), ID)?;
    auth.require_self_or(UserRole::Client, client_id, &BOX_OFFICE)?;
    let tickets = cinema.tickets_query.find_for_client(client_id).await?;
    Ok(list_response(tickets.iter().map(TicketResponse::from)))
}

pub fn ticket_scope() -> Scope {
    web::scope("/tickets")
        .service(create_ticket)
        .service(list_tickets)
        .service(own_tickets)
        .service(update_ticket)
        .service(ticket_by_id)
        .service(delete_ticket)
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
