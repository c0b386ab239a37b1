//! Driving port for movie reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Movie};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieQuery: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Movie, Error>;

    async fn find_all(&self) -> Result<Vec<Movie>, Error>;
}
