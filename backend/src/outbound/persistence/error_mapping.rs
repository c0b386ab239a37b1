//! Shared MongoDB error mapping for the repositories.

use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use tracing::debug;

const DUPLICATE_KEY: i32 = 11_000;

/// Whether a write failed on a unique index.
pub(super) fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

/// Map a driver error into a repository-specific query or connection error.
pub(super) fn map_basic_mongo_error<E, Q, C>(error: MongoError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    debug!(error = %error, "mongo operation failed");
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => connection(error.to_string()),
        _ => query(error.to_string()),
    }
}
