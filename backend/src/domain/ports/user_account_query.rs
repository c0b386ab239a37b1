//! Driving port for account lookups across the three roles.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, UserRole};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountQuery: Send + Sync {
    async fn find_by_id(&self, role: UserRole, id: UserId) -> Result<User, Error>;

    async fn find_by_login(&self, role: UserRole, login: String) -> Result<User, Error>;

    /// Accounts whose login contains `fragment`.
    async fn find_matching(&self, role: UserRole, fragment: String) -> Result<Vec<User>, Error>;

    async fn find_all(&self, role: UserRole) -> Result<Vec<User>, Error>;
}
