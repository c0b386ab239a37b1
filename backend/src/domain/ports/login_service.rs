//! Driving port for login and self-registration.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store or the token format.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, User, UserRole};

use super::NewAccount;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check credentials for an account of `role` and issue a bearer token.
    async fn login(
        &self,
        role: UserRole,
        credentials: LoginCredentials,
    ) -> Result<AccessToken, Error>;

    /// Create a client account on behalf of an anonymous caller.
    async fn register_client(&self, account: NewAccount) -> Result<User, Error>;
}
