//! MongoDB-backed `MovieRepository`.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{MovieRepository, MovieRepositoryError};
use crate::domain::Movie;

use super::documents::MovieDocument;
use super::error_mapping::map_basic_mongo_error;
use super::store::MongoStore;

fn map_mongo_error(error: mongodb::error::Error) -> MovieRepositoryError {
    map_basic_mongo_error(
        error,
        MovieRepositoryError::query,
        MovieRepositoryError::connection,
    )
}

/// Movie repository over the `movies` collection.
///
/// Deletion consults the `tickets` collection and refuses to remove a movie
/// that tickets still reference.
#[derive(Clone, Debug)]
pub struct MongoMovieRepository {
    store: MongoStore,
}

impl MongoMovieRepository {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MovieRepository for MongoMovieRepository {
    async fn create(&self, movie: &Movie) -> Result<(), MovieRepositoryError> {
        self.store
            .movies()
            .insert_one(MovieDocument::from(movie))
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Movie>, MovieRepositoryError> {
        self.store
            .movies()
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(|document| Movie::try_from(document).map_err(MovieRepositoryError::query))
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Movie>, MovieRepositoryError> {
        let documents: Vec<MovieDocument> = self
            .store
            .movies()
            .find(doc! {})
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        documents
            .into_iter()
            .map(|document| Movie::try_from(document).map_err(MovieRepositoryError::query))
            .collect()
    }

    async fn update(&self, movie: &Movie) -> Result<(), MovieRepositoryError> {
        let result = self
            .store
            .movies()
            .replace_one(
                doc! { "_id": movie.id().to_string() },
                MovieDocument::from(movie),
            )
            .await
            .map_err(map_mongo_error)?;
        if result.matched_count == 0 {
            return Err(MovieRepositoryError::not_found(movie.id()));
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), MovieRepositoryError> {
        let references = self
            .store
            .tickets()
            .count_documents(doc! { "movieId": id.to_string() })
            .await
            .map_err(map_mongo_error)?;
        if references > 0 {
            debug!(movie_id = %id, references, "movie still referenced by tickets");
            return Err(MovieRepositoryError::referenced_by_tickets(*id));
        }

        let result = self
            .store
            .movies()
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?;
        if result.deleted_count == 0 {
            return Err(MovieRepositoryError::not_found(*id));
        }
        Ok(())
    }
}
