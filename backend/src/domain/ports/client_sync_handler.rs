//! Driving port invoked by the broker adapter for each saga delivery.

use async_trait::async_trait;

use crate::domain::{ClientSyncMessage, Error};

/// What happened to a delivered saga message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The step was applied locally.
    Applied,
    /// The step failed locally and its rollback was published.
    Compensated,
    /// This side does not handle the step.
    Ignored,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientSyncHandler: Send + Sync {
    /// Handle one message.
    ///
    /// An `Err` means the step failed and could not be compensated; the
    /// message is not redelivered.
    async fn handle(&self, message: ClientSyncMessage) -> Result<SyncOutcome, Error>;
}
