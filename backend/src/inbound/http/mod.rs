//! HTTP inbound adapter exposing REST endpoints.
//!
//! Both deployables mount their routes under `/api/v1`. The users service
//! serves login, client registration and account management; the app
//! additionally serves movies and tickets.

pub mod auth;
pub mod authentication;
pub mod error;
pub mod health;
pub mod if_match;
pub mod movies;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod tickets;
pub mod users;
pub mod validation;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::UserRole;

pub use error::ApiResult;

/// Base path of every REST route.
pub const API_PREFIX: &str = "/api/v1";

/// `200` with the items as a JSON array, or `204` when there are none.
pub(crate) fn list_response<T, I>(items: I) -> HttpResponse
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let items: Vec<T> = items.into_iter().collect();
    if items.is_empty() {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::Ok().json(items)
    }
}

fn local_account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(authentication::login)
        .service(users::account_scope("/admins", UserRole::Admin))
        .service(users::account_scope("/staffs", UserRole::Staff));
}

/// Routes of the cinema app: programme, tickets and accounts.
///
/// Clients are replicas kept by the saga, so their collection is read-only.
///
/// Requires [`state::HttpState`] and [`state::CinemaState`] as app data.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(movies::movie_scope())
        .service(tickets::ticket_scope())
        .service(tickets::client_tickets);
    local_account_routes(cfg);
    cfg.service(users::replica_account_scope("/clients", UserRole::Client));
}

/// Routes of the users service: registration and accounts.
///
/// Requires [`state::HttpState`] as app data.
pub fn configure_users(cfg: &mut web::ServiceConfig) {
    cfg.service(authentication::register_client);
    local_account_routes(cfg);
    cfg.service(users::account_scope("/clients", UserRole::Client));
}
