//! Readiness checks backed by infrastructure handles.

use async_trait::async_trait;

use crate::inbound::http::health::ReadinessCheck;
use crate::outbound::persistence::MongoStore;

/// Reports ready while MongoDB answers `ping`.
pub struct MongoReadiness {
    store: MongoStore,
}

impl MongoReadiness {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReadinessCheck for MongoReadiness {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn check(&self) -> Result<(), String> {
        self.store.ping().await.map_err(|err| err.to_string())
    }
}
