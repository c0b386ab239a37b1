//! Movie use cases.
//!
//! Implements the movie driving ports on top of a [`MovieRepository`],
//! turning validation and persistence failures into domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{MovieCommand, MovieQuery, MovieRepository, MovieRepositoryError};
use crate::domain::{Error, Movie, MovieDraft, MovieValidationError};

fn map_repository_error(error: MovieRepositoryError) -> Error {
    match error {
        MovieRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("movie repository unavailable: {message}"))
        }
        MovieRepositoryError::Query { message } => {
            Error::internal(format!("movie repository error: {message}"))
        }
        MovieRepositoryError::NotFound { id } => Error::not_found(format!("movie {id} not found")),
        MovieRepositoryError::ReferencedByTickets { id } => Error::conflict(format!(
            "movie {id} cannot be deleted while tickets reference it"
        ))
        .with_details(json!({ "code": "movie_in_use" })),
    }
}

fn map_validation_error(error: &MovieValidationError) -> Error {
    let (field, code) = error.field_and_code();
    Error::invalid_request(format!("invalid movie: {error}"))
        .with_details(json!({ "field": field, "code": code }))
}

/// Movie service implementing [`MovieCommand`] and [`MovieQuery`].
#[derive(Clone)]
pub struct MovieService<R> {
    movies: Arc<R>,
}

impl<R> MovieService<R> {
    pub fn new(movies: Arc<R>) -> Self {
        Self { movies }
    }
}

#[async_trait]
impl<R> MovieCommand for MovieService<R>
where
    R: MovieRepository,
{
    async fn create(&self, draft: MovieDraft) -> Result<Movie, Error> {
        let movie = Movie::new(draft).map_err(|err| map_validation_error(&err))?;
        self.movies
            .create(&movie)
            .await
            .map_err(map_repository_error)?;
        info!(movie_id = %movie.id(), "movie created");
        Ok(movie)
    }

    async fn update(&self, draft: MovieDraft) -> Result<Movie, Error> {
        let movie = Movie::new(draft).map_err(|err| map_validation_error(&err))?;
        self.movies
            .update(&movie)
            .await
            .map_err(map_repository_error)?;
        Ok(movie)
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.movies.delete(&id).await.map_err(map_repository_error)?;
        info!(movie_id = %id, "movie deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> MovieQuery for MovieService<R>
where
    R: MovieRepository,
{
    async fn find(&self, id: Uuid) -> Result<Movie, Error> {
        self.movies
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("movie {id} not found")))
    }

    async fn find_all(&self) -> Result<Vec<Movie>, Error> {
        self.movies.find_all().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "movie_service_tests.rs"]
mod tests;
