//! Driven port publishing client lifecycle saga messages.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ClientSyncMessage;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by broker adapters.
    pub enum ClientSyncPublishError {
        /// Broker infrastructure is unavailable.
        Unavailable { message: String } => "client sync broker is unavailable: {message}",
        /// The broker refused or failed to confirm the message.
        Rejected { message: String } => "client sync message was rejected: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientSyncPublisher: Send + Sync {
    /// Publish `message` on the routing key of its step.
    async fn publish(&self, message: &ClientSyncMessage) -> Result<(), ClientSyncPublishError>;
}

/// Publisher for deployments that do not take part in a given direction of
/// the saga; messages are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpClientSyncPublisher;

#[async_trait]
impl ClientSyncPublisher for NoOpClientSyncPublisher {
    async fn publish(&self, message: &ClientSyncMessage) -> Result<(), ClientSyncPublishError> {
        debug!(step = %message.step(), client_id = %message.client_id(), "dropping client sync message");
        Ok(())
    }
}
