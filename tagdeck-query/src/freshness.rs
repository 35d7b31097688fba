//! Entry status and the snapshots published to subscribers.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::SharedError;

/// Lifecycle of a cache entry.
///
/// ```text
/// idle -> loading -> fresh | error
/// fresh -> stale            (freshness window elapsed)
/// any   -> loading          (refetch or optimistic mutation)
/// ```
///
/// An optimistic overlay is a sub-state of `Loading`; it always ends in a
/// commit (`Fresh`) or a rollback (`Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Fresh,
    Stale,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Error => "error",
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Fresh | Self::Stale | Self::Error)
    }
}

/// Point-in-time view of a cache entry.
///
/// `data` is what the UI should display: the committed value with pending
/// overlays applied. After a rollback it is the committed value alone.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub data: Option<T>,
    pub status: QueryStatus,
    pub last_fetched: Option<DateTime<Utc>>,
    pub error: Option<SharedError>,
    /// At least one optimistic overlay is pending.
    pub optimistic: bool,
    /// A fetch is in flight.
    pub fetching: bool,
    /// Argument the current data was fetched for.
    pub arg: Option<String>,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            last_fetched: None,
            error: None,
            optimistic: false,
            fetching: false,
            arg: None,
        }
    }
}

impl<T> QuerySnapshot<T> {
    /// Time since the last successful fetch or commit.
    pub fn staleness(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_fetched.map(|at| {
            now.signed_duration_since(at)
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    pub fn map<U, F>(self, f: F) -> QuerySnapshot<U>
    where
        F: FnOnce(T) -> U,
    {
        QuerySnapshot {
            data: self.data.map(f),
            status: self.status,
            last_fetched: self.last_fetched,
            error: self.error,
            optimistic: self.optimistic,
            fetching: self.fetching,
            arg: self.arg,
        }
    }
}

/// Whether data fetched at `last_fetched` has outlived `stale_time`.
pub(crate) fn is_past_window(
    last_fetched: Option<DateTime<Utc>>,
    stale_time: Duration,
    now: DateTime<Utc>,
) -> bool {
    match last_fetched {
        Some(at) => {
            let age = now.signed_duration_since(at).to_std().unwrap_or(Duration::ZERO);
            age >= stale_time
        }
        None => true,
    }
}
