//! Shared MongoDB handle.

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::info;

use super::documents::{MovieDocument, TicketDocument, UserDocument};

const MOVIES: &str = "movies";
const TICKETS: &str = "tickets";
const USERS: &str = "users";

/// Errors raised while connecting to MongoDB or preparing collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MongoConfigError {
    #[error("failed to connect to MongoDB: {message}")]
    Connect { message: String },
    #[error("failed to prepare MongoDB collections: {message}")]
    Setup { message: String },
}

/// Database handle shared by the Mongo repositories.
///
/// Cloning is cheap; the underlying client pools its connections.
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to `uri`, select `database` and ensure the indexes exist.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, MongoConfigError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|err| MongoConfigError::Connect {
                message: err.to_string(),
            })?;
        let store = Self {
            database: client.database(database),
        };
        store.ensure_indexes().await?;
        info!(database, "mongo store ready");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), MongoConfigError> {
        let unique_login = IndexModel::builder()
            .keys(doc! { "login": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("users_login_unique".to_owned())
                    .build(),
            )
            .build();
        self.users()
            .create_index(unique_login)
            .await
            .map_err(|err| MongoConfigError::Setup {
                message: err.to_string(),
            })?;

        for field in ["movieId", "clientId"] {
            self.tickets()
                .create_index(IndexModel::builder().keys(doc! { field: 1 }).build())
                .await
                .map_err(|err| MongoConfigError::Setup {
                    message: err.to_string(),
                })?;
        }
        Ok(())
    }

    /// Round-trip a `ping` command; used by the readiness probe.
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.database.run_command(doc! { "ping": 1 }).await.map(|_| ())
    }

    pub(super) fn movies(&self) -> Collection<MovieDocument> {
        self.database.collection(MOVIES)
    }

    pub(super) fn tickets(&self) -> Collection<TicketDocument> {
        self.database.collection(TICKETS)
    }

    pub(super) fn users(&self) -> Collection<UserDocument> {
        self.database.collection(USERS)
    }
}
