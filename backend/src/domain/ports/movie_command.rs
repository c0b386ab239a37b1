//! Driving port for movie mutations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Movie, MovieDraft};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieCommand: Send + Sync {
    /// Validate and store a new movie.
    async fn create(&self, draft: MovieDraft) -> Result<Movie, Error>;

    /// Validate and replace an existing movie.
    async fn update(&self, draft: MovieDraft) -> Result<Movie, Error>;

    /// Remove a movie no ticket refers to.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}
