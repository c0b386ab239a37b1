//! Entity tags used for optimistic concurrency on updates.
//!
//! A GET by id returns the signed form of a [`ResourceTag`] as `ETag`; an
//! update must echo it back in `If-Match`. The tag covers the identity fields
//! a client must not change behind the server's back: the id for every
//! resource, plus the login for user accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of resource a tag was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Movie,
    Ticket,
    User,
}

/// Unsigned identity of a resource version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub kind: ResourceKind,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

impl ResourceTag {
    #[must_use]
    pub fn movie(id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Movie,
            id,
            login: None,
        }
    }

    #[must_use]
    pub fn ticket(id: Uuid) -> Self {
        Self {
            kind: ResourceKind::Ticket,
            id,
            login: None,
        }
    }

    #[must_use]
    pub fn user(id: Uuid, login: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::User,
            id,
            login: Some(login.into()),
        }
    }
}

impl fmt::Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.login {
            Some(login) => write!(f, "{:?}:{}:{login}", self.kind, self.id),
            None => write!(f, "{:?}:{}", self.kind, self.id),
        }
    }
}
