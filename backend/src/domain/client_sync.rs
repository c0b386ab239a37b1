//! Messages exchanged by the client lifecycle saga.
//!
//! The user service publishes a forward step after changing a client; the
//! app replays it on its replica and, when that fails, answers with the
//! matching rollback step so the user service can undo its change.
//!
//! ```text
//! create      -> create.rollback      (delete the client)
//! activate    -> activate.rollback    (deactivate the client)
//! deactivate  -> deactivate.rollback  (activate the client)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// One step of the saga; each has its own routing key and queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStep {
    Create,
    CreateRollback,
    Activate,
    ActivateRollback,
    Deactivate,
    DeactivateRollback,
}

impl SyncStep {
    /// Forward steps, consumed by the replica side.
    pub const FORWARD: [Self; 3] = [Self::Create, Self::Activate, Self::Deactivate];
    /// Compensating steps, consumed by the originating side.
    pub const ROLLBACK: [Self; 3] = [
        Self::CreateRollback,
        Self::ActivateRollback,
        Self::DeactivateRollback,
    ];

    /// Dotted name used to derive routing keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::CreateRollback => "create.rollback",
            Self::Activate => "activate",
            Self::ActivateRollback => "activate.rollback",
            Self::Deactivate => "deactivate",
            Self::DeactivateRollback => "deactivate.rollback",
        }
    }

    #[must_use]
    pub const fn is_rollback(self) -> bool {
        matches!(
            self,
            Self::CreateRollback | Self::ActivateRollback | Self::DeactivateRollback
        )
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the create step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreateMessage {
    pub client_id: UserId,
    pub client_login: String,
}

/// Body of every step that only names the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdMessage {
    pub client_id: UserId,
}

/// A saga message together with the step it travels on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSyncMessage {
    Create(ClientCreateMessage),
    CreateRollback(ClientIdMessage),
    Activate(ClientIdMessage),
    ActivateRollback(ClientIdMessage),
    Deactivate(ClientIdMessage),
    DeactivateRollback(ClientIdMessage),
}

impl ClientSyncMessage {
    /// Build the message for `step` naming only the client.
    ///
    /// The create step needs a login and is built directly instead.
    #[must_use]
    pub fn for_client(step: SyncStep, client_id: UserId) -> Option<Self> {
        let body = ClientIdMessage { client_id };
        match step {
            SyncStep::Create => None,
            SyncStep::CreateRollback => Some(Self::CreateRollback(body)),
            SyncStep::Activate => Some(Self::Activate(body)),
            SyncStep::ActivateRollback => Some(Self::ActivateRollback(body)),
            SyncStep::Deactivate => Some(Self::Deactivate(body)),
            SyncStep::DeactivateRollback => Some(Self::DeactivateRollback(body)),
        }
    }

    #[must_use]
    pub fn step(&self) -> SyncStep {
        match self {
            Self::Create(_) => SyncStep::Create,
            Self::CreateRollback(_) => SyncStep::CreateRollback,
            Self::Activate(_) => SyncStep::Activate,
            Self::ActivateRollback(_) => SyncStep::ActivateRollback,
            Self::Deactivate(_) => SyncStep::Deactivate,
            Self::DeactivateRollback(_) => SyncStep::DeactivateRollback,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> UserId {
        match self {
            Self::Create(body) => body.client_id,
            Self::CreateRollback(body)
            | Self::Activate(body)
            | Self::ActivateRollback(body)
            | Self::Deactivate(body)
            | Self::DeactivateRollback(body) => body.client_id,
        }
    }

    /// The compensating message for a forward step; `None` for rollbacks.
    #[must_use]
    pub fn rollback(&self) -> Option<Self> {
        let body = ClientIdMessage {
            client_id: self.client_id(),
        };
        match self {
            Self::Create(_) => Some(Self::CreateRollback(body)),
            Self::Activate(_) => Some(Self::ActivateRollback(body)),
            Self::Deactivate(_) => Some(Self::DeactivateRollback(body)),
            Self::CreateRollback(_) | Self::ActivateRollback(_) | Self::DeactivateRollback(_) => {
                None
            }
        }
    }

    /// Encode the body as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::Create(body) => serde_json::to_vec(body),
            Self::CreateRollback(body)
            | Self::Activate(body)
            | Self::ActivateRollback(body)
            | Self::Deactivate(body)
            | Self::DeactivateRollback(body) => serde_json::to_vec(body),
        }
    }

    /// Decode a JSON body received on `step`.
    ///
    /// # Examples
    /// ```
    /// use cinema::domain::{ClientSyncMessage, SyncStep};
    ///
    /// let body = br#"{"clientId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#;
    /// let message = ClientSyncMessage::from_json(SyncStep::Activate, body).expect("decodes");
    /// assert_eq!(message.step(), SyncStep::Activate);
    /// ```
    pub fn from_json(step: SyncStep, body: &[u8]) -> Result<Self, serde_json::Error> {
        match step {
            SyncStep::Create => serde_json::from_slice(body).map(Self::Create),
            SyncStep::CreateRollback => serde_json::from_slice(body).map(Self::CreateRollback),
            SyncStep::Activate => serde_json::from_slice(body).map(Self::Activate),
            SyncStep::ActivateRollback => serde_json::from_slice(body).map(Self::ActivateRollback),
            SyncStep::Deactivate => serde_json::from_slice(body).map(Self::Deactivate),
            SyncStep::DeactivateRollback => {
                serde_json::from_slice(body).map(Self::DeactivateRollback)
            }
        }
    }
}
