//! In-memory repositories for development and tests.
//!
//! The three repositories share one [`InMemoryStore`] so cross-collection
//! rules (unique logins, movies referenced by tickets) behave as they do
//! against MongoDB. Contents are lost when the process exits.

mod repositories;
mod store;

pub use repositories::{InMemoryMovieRepository, InMemoryTicketRepository, InMemoryUserRepository};
pub use store::InMemoryStore;
