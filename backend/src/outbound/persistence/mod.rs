//! MongoDB persistence adapters.
//!
//! Repositories translate between domain aggregates and the document types
//! in `documents.rs`; documents never leave this module. All repositories
//! share one [`MongoStore`], which owns the client handle and the indexes
//! the adapters rely on.
//!
//! # Example
//!
//! ```ignore
//! use cinema::outbound::persistence::{MongoStore, MongoUserRepository};
//!
//! let store = MongoStore::connect("mongodb://localhost:27017", "cinema").await?;
//! let users = MongoUserRepository::new(store.clone());
//! ```

mod documents;
mod error_mapping;
mod mongo_movie_repository;
mod mongo_ticket_repository;
mod mongo_user_repository;
mod store;

pub use mongo_movie_repository::MongoMovieRepository;
pub use mongo_ticket_repository::MongoTicketRepository;
pub use mongo_user_repository::MongoUserRepository;
pub use store::{MongoConfigError, MongoStore};
