//! Error types for the query cache.

use std::error::Error as StdError;
use std::sync::Arc;

/// A failure recorded in a cache entry.
///
/// Shared so that every snapshot handed to subscribers can carry it.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("query key '{key}' already holds a value of a different type")]
    TypeMismatch { key: &'static str },

    #[error("fetch for '{key}' failed: {source}")]
    Fetch {
        key: &'static str,
        #[source]
        source: SharedError,
    },

    #[error("mutation {ticket} on '{key}' is not pending")]
    UnknownTicket { key: &'static str, ticket: u64 },

    #[error("no data available for '{key}'")]
    Unavailable { key: &'static str },
}

impl QueryError {
    /// The error returned by the fetcher, if this is a fetch failure.
    pub fn fetch_source(&self) -> Option<&SharedError> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}
