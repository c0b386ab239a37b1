//! Bearer token authentication for HTTP handlers.
//!
//! [`Authenticated`] reads `Authorization: Bearer <token>`, verifies it with
//! the [`TokenVerifier`](crate::domain::ports::TokenVerifier) in
//! [`HttpState`] and exposes the claims. Role checks return `403`; missing
//! or invalid tokens return `401`.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{AccessClaims, Error, UserId, UserRole};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Claims of a verified bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(AccessClaims);

impl Authenticated {
    #[must_use]
    pub fn claims(&self) -> &AccessClaims {
        &self.0
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.0.role
    }

    /// Require one of `roles`.
    pub fn require_any(&self, roles: &[UserRole]) -> Result<(), Error> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "{} accounts may not perform this action",
                self.0.role
            )))
        }
    }

    pub fn require_role(&self, role: UserRole) -> Result<(), Error> {
        self.require_any(&[role])
    }

    /// Allow the account itself or one of the `privileged` roles.
    pub fn require_self_or(
        &self,
        role: UserRole,
        id: UserId,
        privileged: &[UserRole],
    ) -> Result<(), Error> {
        if privileged.contains(&self.0.role) || (self.0.role == role && self.0.is(id)) {
            Ok(())
        } else {
            Err(Error::forbidden("access to another account is not allowed"))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("bearer token required"))
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req)?;
    state
        .tokens
        .verify(token)
        .map(Authenticated)
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            match err {
                TokenError::Expired => Error::unauthorized("token has expired"),
                TokenError::Invalid { .. } | TokenError::Signing { .. } => {
                    Error::unauthorized("token is invalid")
                }
            }
        })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
