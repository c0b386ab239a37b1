//! Driven ports for issuing and verifying bearer tokens.
//!
//! Both deployables share the signing key, so a token issued by the user
//! service is accepted by the app.

use uuid::Uuid;

use crate::domain::{AccessClaims, AccessToken, User, UserId, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signature, structure or claims are wrong.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token was valid but its lifetime has passed.
        Expired => "token has expired",
        /// The token could not be produced.
        Signing { message: String } => "token could not be signed: {message}",
    }
}

/// Issues bearer tokens for authenticated accounts.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError>;
}

/// Verifies bearer tokens presented with requests.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError>;
}

/// Unsigned verifier for handler tests.
///
/// Accepts tokens of the form `fixture:<role>:<uuid>:<login>` as produced by
/// [`FixtureTokenVerifier::token_for`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenVerifier;

impl FixtureTokenVerifier {
    /// Build a token this verifier accepts.
    #[must_use]
    pub fn token_for(role: UserRole, id: Uuid, login: &str) -> String {
        format!("fixture:{role}:{id}:{login}")
    }
}

impl TokenVerifier for FixtureTokenVerifier {
    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut parts = token.splitn(4, ':');
        let (Some("fixture"), Some(role), Some(id), Some(login)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::invalid("unrecognised fixture token"));
        };
        let role = role
            .parse::<UserRole>()
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        let user_id = UserId::new(id).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(AccessClaims {
            user_id,
            login: login.to_owned(),
            role,
            expires_at: chrono::DateTime::<chrono::Utc>::MAX_UTC,
        })
    }
}
