//! Account use cases for clients, admins and staff.
//!
//! Client accounts are mirrored by the app deployable. When this service is
//! wired with a live [`ClientSyncPublisher`] it originates the lifecycle
//! saga: every client create, activate or deactivate is announced on the
//! broker. If the announcement cannot be published the local change is
//! reverted so both sides stay aligned.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AccountUpdate, ClientSyncPublisher, NewAccount, PasswordHasher, UserAccountCommand,
    UserAccountQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{
    ClientCreateMessage, ClientSyncMessage, Error, PlainPassword, PasswordHash, SyncStep, User,
    UserId, UserRole,
};

pub(crate) fn map_user_error(role: UserRole, error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateLogin { login } => {
            Error::conflict(format!("{role} login {login} is already taken"))
                .with_details(json!({ "field": "login", "code": "duplicate_login" }))
        }
        UserRepositoryError::NotFound { id } => Error::not_found(format!("{role} {id} not found")),
    }
}

/// Account service implementing [`UserAccountCommand`] and [`UserAccountQuery`].
#[derive(Clone)]
pub struct UserAccountService<R, H, P> {
    users: Arc<R>,
    hasher: Arc<H>,
    publisher: Arc<P>,
}

impl<R, H, P> UserAccountService<R, H, P> {
    pub fn new(users: Arc<R>, hasher: Arc<H>, publisher: Arc<P>) -> Self {
        Self {
            users,
            hasher,
            publisher,
        }
    }
}

impl<R, H, P> UserAccountService<R, H, P>
where
    R: UserRepository,
    H: PasswordHasher,
    P: ClientSyncPublisher,
{
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn load(&self, role: UserRole, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(role, &id)
            .await
            .map_err(|err| map_user_error(role, err))?
            .ok_or_else(|| Error::not_found(format!("{role} {id} not found")))
    }

    /// Publish a forward saga step, undoing the local change when that fails.
    async fn announce<F, Fut>(&self, message: ClientSyncMessage, undo: F) -> Result<(), Error>
    where
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = Result<(), UserRepositoryError>> + Send,
    {
        let step = message.step();
        let client_id = message.client_id();
        let Err(publish_error) = self.publisher.publish(&message).await else {
            info!(%step, %client_id, "client lifecycle change announced");
            return Ok(());
        };

        warn!(%step, %client_id, error = %publish_error, "announcement failed; reverting");
        if let Err(undo_error) = undo().await {
            error!(%step, %client_id, error = %undo_error, "revert after failed announcement failed");
        }
        Err(Error::service_unavailable(format!(
            "client {step} could not be synchronised: {publish_error}"
        )))
    }

    async fn set_active(&self, role: UserRole, id: UserId, active: bool) -> Result<(), Error> {
        self.users
            .set_active(role, &id, active)
            .await
            .map_err(|err| map_user_error(role, err))?;
        info!(%role, user_id = %id, active, "account status changed");

        if role != UserRole::Client {
            return Ok(());
        }
        let step = if active {
            SyncStep::Activate
        } else {
            SyncStep::Deactivate
        };
        let Some(message) = ClientSyncMessage::for_client(step, id) else {
            return Ok(());
        };
        let users = Arc::clone(&self.users);
        self.announce(message, move || async move {
            users.set_active(UserRole::Client, &id, !active).await
        })
        .await
    }
}

#[async_trait]
impl<R, H, P> UserAccountCommand for UserAccountService<R, H, P>
where
    R: UserRepository,
    H: PasswordHasher,
    P: ClientSyncPublisher,
{
    async fn create(&self, role: UserRole, account: NewAccount) -> Result<User, Error> {
        let NewAccount { login, password } = account;
        let hash = self.hash(&password)?;
        let user = User::new(UserId::random(), login, hash, role);
        self.users
            .create(&user)
            .await
            .map_err(|err| map_user_error(role, err))?;
        info!(%role, user_id = %user.id(), "account created");

        if role == UserRole::Client {
            let id = user.id();
            let message = ClientSyncMessage::Create(ClientCreateMessage {
                client_id: id,
                client_login: user.login().to_string(),
            });
            let users = Arc::clone(&self.users);
            self.announce(message, move || async move {
                users.delete(UserRole::Client, &id).await
            })
            .await?;
        }
        Ok(user)
    }

    async fn update(&self, role: UserRole, update: AccountUpdate) -> Result<User, Error> {
        let AccountUpdate {
            id,
            login,
            password,
        } = update;
        let mut user = self.load(role, id).await?;
        user.set_login(login);
        if let Some(password) = password {
            user.set_password(self.hash(&password)?);
        }
        self.users
            .update(&user)
            .await
            .map_err(|err| map_user_error(role, err))?;
        Ok(user)
    }

    async fn activate(&self, role: UserRole, id: UserId) -> Result<(), Error> {
        self.set_active(role, id, true).await
    }

    async fn deactivate(&self, role: UserRole, id: UserId) -> Result<(), Error> {
        self.set_active(role, id, false).await
    }

    async fn delete(&self, role: UserRole, id: UserId) -> Result<(), Error> {
        self.users
            .delete(role, &id)
            .await
            .map_err(|err| map_user_error(role, err))?;
        info!(%role, user_id = %id, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, H, P> UserAccountQuery for UserAccountService<R, H, P>
where
    R: UserRepository,
    H: PasswordHasher,
    P: ClientSyncPublisher,
{
    async fn find_by_id(&self, role: UserRole, id: UserId) -> Result<User, Error> {
        self.load(role, id).await
    }

    async fn find_by_login(&self, role: UserRole, login: String) -> Result<User, Error> {
        self.users
            .find_by_login(role, &login)
            .await
            .map_err(|err| map_user_error(role, err))?
            .ok_or_else(|| Error::not_found(format!("{role} with login {login} not found")))
    }

    async fn find_matching(&self, role: UserRole, fragment: String) -> Result<Vec<User>, Error> {
        self.users
            .find_matching_login(role, &fragment)
            .await
            .map_err(|err| map_user_error(role, err))
    }

    async fn find_all(&self, role: UserRole) -> Result<Vec<User>, Error> {
        self.users
            .find_all(role)
            .await
            .map_err(|err| map_user_error(role, err))
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
