//! Driving port for account management across the three roles.

use async_trait::async_trait;

use crate::domain::{Error, Login, PlainPassword, User, UserId, UserRole};

/// Fields of a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login: Login,
    pub password: PlainPassword,
}

/// Full replacement of an account's editable fields.
///
/// `password` is only re-hashed when present.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub id: UserId,
    pub login: Login,
    pub password: Option<PlainPassword>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    async fn create(&self, role: UserRole, account: NewAccount) -> Result<User, Error>;

    async fn update(&self, role: UserRole, update: AccountUpdate) -> Result<User, Error>;

    async fn activate(&self, role: UserRole, id: UserId) -> Result<(), Error>;

    async fn deactivate(&self, role: UserRole, id: UserId) -> Result<(), Error>;

    async fn delete(&self, role: UserRole, id: UserId) -> Result<(), Error>;
}
