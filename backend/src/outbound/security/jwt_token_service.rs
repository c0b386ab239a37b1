//! HS256 bearer tokens.
//!
//! Claims: `sub` (account id), `login`, `role`, `iat` and `exp` in seconds
//! since the epoch. Expiry is checked against the injected clock rather than
//! the system time so tests can pin "now".

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenIssuer, TokenVerifier};
use crate::domain::{AccessClaims, AccessToken, User, UserId, UserRole};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    login: String,
    role: UserRole,
    iat: i64,
    exp: i64,
}

/// Issues and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: user.id().to_string(),
            login: user.login().as_str().to_owned(),
            role: user.role(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }
}

impl TokenVerifier for JwtTokenService {
    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| TokenError::invalid(err.to_string()))?
            .claims;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::invalid("expiry out of range"))?;
        if expires_at <= self.clock.utc() {
            return Err(TokenError::expired());
        }
        let user_id = UserId::new(&claims.sub).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(AccessClaims {
            user_id,
            login: claims.login,
            role: claims.role,
            expires_at,
        })
    }
}
