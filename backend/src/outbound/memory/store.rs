//! Shared in-memory state.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Movie, Ticket, User};

#[derive(Debug, Default)]
pub(super) struct Collections {
    pub movies: BTreeMap<Uuid, Movie>,
    pub tickets: BTreeMap<Uuid, Ticket>,
    pub users: BTreeMap<Uuid, User>,
}

/// Process-local stand-in for the document store.
///
/// Cloning shares the same collections.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn collections(&self) -> &RwLock<Collections> {
        &self.collections
    }
}
