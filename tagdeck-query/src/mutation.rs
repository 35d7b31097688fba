//! Optimistic mutation tickets and commit values.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::key::QueryKey;

/// Overlay transform replayed over the committed value until its ticket is
/// settled.
pub(crate) type Overlay<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Handle to one pending optimistic overlay.
///
/// Returned by `mutate_optimistic` and consumed by exactly one of
/// `mutate_success` or `mutate_error`.
#[must_use = "an optimistic overlay stays applied until its ticket is settled"]
pub struct MutationTicket<T> {
    key: QueryKey<T>,
    id: u64,
    _value: PhantomData<fn() -> T>,
}

impl<T> MutationTicket<T> {
    pub(crate) fn new(key: QueryKey<T>, id: u64) -> Self {
        Self {
            key,
            id,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> QueryKey<T> {
        self.key
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> fmt::Debug for MutationTicket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationTicket")
            .field("key", &self.key.name())
            .field("id", &self.id)
            .finish()
    }
}

/// The authoritative value a ticket is committed with.
pub enum Commit<T> {
    /// Replace the committed value outright.
    Value(T),
    /// Derive the new committed value from the previous one. Skipped when
    /// nothing has been committed yet.
    Transform(Box<dyn FnOnce(T) -> T + Send>),
}

impl<T> Commit<T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(T) -> T + Send + 'static,
    {
        Self::Transform(Box::new(f))
    }

    pub(crate) fn apply(self, base: Option<T>) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Transform(f) => base.map(f),
        }
    }
}

impl<T> fmt::Debug for Commit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Commit::Value(..)"),
            Self::Transform(_) => f.write_str("Commit::Transform(..)"),
        }
    }
}
