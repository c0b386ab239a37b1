//! Both ends of the client lifecycle saga.
//!
//! [`ClientReplicaService`] runs in the app and replays forward steps on its
//! copy of the client accounts. [`ClientCompensationService`] runs in the
//! user service and undoes a change when the app reports that it could not
//! apply it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    ClientSyncHandler, ClientSyncPublisher, SyncOutcome, UserRepository, UserRepositoryError,
};
use crate::domain::user_account_service::map_user_error;
use crate::domain::{ClientSyncMessage, Error, Login, User, UserId, UserRole};

/// Applies forward steps to the local client replicas.
#[derive(Clone)]
pub struct ClientReplicaService<R, P> {
    users: Arc<R>,
    rollbacks: Arc<P>,
}

impl<R, P> ClientReplicaService<R, P> {
    /// `rollbacks` carries compensating messages back to the originator.
    pub fn new(users: Arc<R>, rollbacks: Arc<P>) -> Self {
        Self { users, rollbacks }
    }
}

impl<R, P> ClientReplicaService<R, P>
where
    R: UserRepository,
    P: ClientSyncPublisher,
{
    async fn apply(&self, message: &ClientSyncMessage) -> Result<(), String> {
        let client_id = message.client_id();
        let result = match message {
            ClientSyncMessage::Create(body) => {
                let login = Login::new(body.client_login.as_str()).map_err(|err| err.to_string())?;
                self.users
                    .create(&User::client_replica(client_id, login))
                    .await
            }
            ClientSyncMessage::Activate(_) => {
                self.users
                    .set_active(UserRole::Client, &client_id, true)
                    .await
            }
            ClientSyncMessage::Deactivate(_) => {
                self.users
                    .set_active(UserRole::Client, &client_id, false)
                    .await
            }
            ClientSyncMessage::CreateRollback(_)
            | ClientSyncMessage::ActivateRollback(_)
            | ClientSyncMessage::DeactivateRollback(_) => Ok(()),
        };
        result.map_err(|err| err.to_string())
    }
}

#[async_trait]
impl<R, P> ClientSyncHandler for ClientReplicaService<R, P>
where
    R: UserRepository,
    P: ClientSyncPublisher,
{
    async fn handle(&self, message: ClientSyncMessage) -> Result<SyncOutcome, Error> {
        let step = message.step();
        let client_id = message.client_id();
        let Some(rollback) = message.rollback() else {
            return Ok(SyncOutcome::Ignored);
        };

        let Err(reason) = self.apply(&message).await else {
            info!(%step, %client_id, "client replica updated");
            return Ok(SyncOutcome::Applied);
        };

        warn!(%step, %client_id, %reason, "client replica update failed; requesting rollback");
        self.rollbacks.publish(&rollback).await.map_err(|err| {
            Error::service_unavailable(format!(
                "rollback of client {step} for {client_id} could not be published: {err}"
            ))
        })?;
        Ok(SyncOutcome::Compensated)
    }
}

/// Undoes client changes the replica side could not apply.
#[derive(Clone)]
pub struct ClientCompensationService<R> {
    users: Arc<R>,
}

impl<R> ClientCompensationService<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R: UserRepository> ClientCompensationService<R> {
    async fn undo(&self, message: &ClientSyncMessage, id: &UserId) -> Result<(), UserRepositoryError> {
        match message {
            ClientSyncMessage::CreateRollback(_) => self.users.delete(UserRole::Client, id).await,
            ClientSyncMessage::ActivateRollback(_) => {
                self.users.set_active(UserRole::Client, id, false).await
            }
            ClientSyncMessage::DeactivateRollback(_) => {
                self.users.set_active(UserRole::Client, id, true).await
            }
            ClientSyncMessage::Create(_)
            | ClientSyncMessage::Activate(_)
            | ClientSyncMessage::Deactivate(_) => Ok(()),
        }
    }
}

#[async_trait]
impl<R> ClientSyncHandler for ClientCompensationService<R>
where
    R: UserRepository,
{
    async fn handle(&self, message: ClientSyncMessage) -> Result<SyncOutcome, Error> {
        let step = message.step();
        let client_id = message.client_id();
        if !step.is_rollback() {
            return Ok(SyncOutcome::Ignored);
        }

        match self.undo(&message, &client_id).await {
            Ok(()) => {
                info!(%step, %client_id, "client change rolled back");
                Ok(SyncOutcome::Applied)
            }
            Err(UserRepositoryError::NotFound { .. }) => {
                warn!(%step, %client_id, "client to roll back no longer exists");
                Ok(SyncOutcome::Ignored)
            }
            Err(err) => Err(map_user_error(UserRole::Client, err)),
        }
    }
}
