//! Driven port for user account persistence.
//!
//! One repository serves all three roles; every lookup is scoped by
//! [`UserRole`] so a client id never resolves to a staff account. Logins are
//! unique across roles and the adapter reports clashes as
//! [`UserRepositoryError::DuplicateLogin`].

use async_trait::async_trait;

use crate::domain::{User, UserId, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user persistence adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the login.
        DuplicateLogin { login: String } => "login {login} is already taken",
        /// No account of the requested role has this id.
        NotFound { id: UserId } => "user {id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch an account of `role` by id.
    async fn find_by_id(
        &self,
        role: UserRole,
        id: &UserId,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account of `role` by exact login.
    async fn find_by_login(
        &self,
        role: UserRole,
        login: &str,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Accounts of `role` whose login contains `fragment` (case-insensitive).
    async fn find_matching_login(
        &self,
        role: UserRole,
        fragment: &str,
    ) -> Result<Vec<User>, UserRepositoryError>;

    /// Every account of `role`.
    async fn find_all(&self, role: UserRole) -> Result<Vec<User>, UserRepositoryError>;

    /// Replace a stored account.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Set the active flag of an account of `role`.
    async fn set_active(
        &self,
        role: UserRole,
        id: &UserId,
        active: bool,
    ) -> Result<(), UserRepositoryError>;

    /// Remove an account of `role`.
    async fn delete(&self, role: UserRole, id: &UserId) -> Result<(), UserRepositoryError>;
}
