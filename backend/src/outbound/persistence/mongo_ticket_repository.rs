//! MongoDB-backed `TicketRepository`.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use uuid::Uuid;

use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{Ticket, UserId};

use super::documents::TicketDocument;
use super::error_mapping::map_basic_mongo_error;
use super::store::MongoStore;

fn map_mongo_error(error: mongodb::error::Error) -> TicketRepositoryError {
    map_basic_mongo_error(
        error,
        TicketRepositoryError::query,
        TicketRepositoryError::connection,
    )
}

/// Ticket repository over the `tickets` collection.
#[derive(Clone, Debug)]
pub struct MongoTicketRepository {
    store: MongoStore,
}

impl MongoTicketRepository {
    pub fn new(store: MongoStore) -> Self {
        Self { store }
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<Ticket>, TicketRepositoryError> {
        let documents: Vec<TicketDocument> = self
            .store
            .tickets()
            .find(filter)
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        documents
            .into_iter()
            .map(|document| Ticket::try_from(document).map_err(TicketRepositoryError::query))
            .collect()
    }
}

#[async_trait]
impl TicketRepository for MongoTicketRepository {
    async fn create(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        self.store
            .tickets()
            .insert_one(TicketDocument::from(ticket))
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Ticket>, TicketRepositoryError> {
        self.store
            .tickets()
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?
            .map(|document| Ticket::try_from(document).map_err(TicketRepositoryError::query))
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Ticket>, TicketRepositoryError> {
        self.find_many(doc! {}).await
    }

    async fn find_by_client(&self, client_id: &UserId) -> Result<Vec<Ticket>, TicketRepositoryError> {
        self.find_many(doc! { "clientId": client_id.to_string() })
            .await
    }

    async fn find_by_movie(&self, movie_id: &Uuid) -> Result<Vec<Ticket>, TicketRepositoryError> {
        self.find_many(doc! { "movieId": movie_id.to_string() })
            .await
    }

    async fn count_by_movie(&self, movie_id: &Uuid) -> Result<u64, TicketRepositoryError> {
        self.store
            .tickets()
            .count_documents(doc! { "movieId": movie_id.to_string() })
            .await
            .map_err(map_mongo_error)
    }

    async fn update(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let result = self
            .store
            .tickets()
            .replace_one(
                doc! { "_id": ticket.id().to_string() },
                TicketDocument::from(ticket),
            )
            .await
            .map_err(map_mongo_error)?;
        if result.matched_count == 0 {
            return Err(TicketRepositoryError::not_found(ticket.id()));
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), TicketRepositoryError> {
        let result = self
            .store
            .tickets()
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_error)?;
        if result.deleted_count == 0 {
            return Err(TicketRepositoryError::not_found(*id));
        }
        Ok(())
    }
}
