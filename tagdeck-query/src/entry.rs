//! Per-key cache entry state.

use std::any::Any;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::QueryConfig;
use crate::error::SharedError;
use crate::freshness::{is_past_window, QuerySnapshot, QueryStatus};
use crate::mutation::{Commit, Overlay};

/// Operations the client runs across entries without knowing their value
/// type.
pub(crate) trait ErasedEntry: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn is_evictable(&self, now: DateTime<Utc>) -> bool;
    fn mark_stale(&mut self, now: DateTime<Utc>) -> bool;
    fn invalidate(&mut self);
    fn refetches_on_focus(&self) -> bool;
}

pub(crate) struct Entry<T> {
    key: &'static str,
    pub(crate) config: QueryConfig,
    committed: Option<T>,
    overlays: Vec<(u64, Overlay<T>)>,
    status: QueryStatus,
    last_fetched: Option<DateTime<Utc>>,
    last_active: DateTime<Utc>,
    error: Option<SharedError>,
    fetch_seq: u64,
    fetching: bool,
    arg: Option<String>,
    invalidated: bool,
    tx: watch::Sender<QuerySnapshot<T>>,
}

impl<T> Entry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(key: &'static str, config: QueryConfig, now: DateTime<Utc>) -> Self {
        let (tx, _) = watch::channel(QuerySnapshot::default());
        Self {
            key,
            config,
            committed: None,
            overlays: Vec::new(),
            status: QueryStatus::Idle,
            last_fetched: None,
            last_active: now,
            error: None,
            fetch_seq: 0,
            fetching: false,
            arg: None,
            invalidated: false,
            tx,
        }
    }

    /// Committed value with every pending overlay replayed in issue order.
    fn view(&self) -> Option<T> {
        self.committed
            .clone()
            .map(|base| self.overlays.iter().fold(base, |acc, (_, overlay)| overlay(acc)))
    }

    pub(crate) fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot {
            data: self.view(),
            status: self.status,
            last_fetched: self.last_fetched,
            error: self.error.clone(),
            optimistic: !self.overlays.is_empty(),
            fetching: self.fetching,
            arg: self.arg.clone(),
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn settled_status(&self) -> QueryStatus {
        if self.overlays.is_empty() && !self.fetching {
            QueryStatus::Fresh
        } else {
            QueryStatus::Loading
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<QuerySnapshot<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    pub(crate) fn is_fetching_for(&self, arg: &Option<String>) -> bool {
        self.fetching && &self.arg == arg
    }

    pub(crate) fn needs_fetch(&self, arg: &Option<String>, now: DateTime<Utc>) -> bool {
        self.committed.is_none()
            || &self.arg != arg
            || self.invalidated
            || self.status == QueryStatus::Error
            || is_past_window(self.last_fetched, self.config.stale_time, now)
    }

    pub(crate) fn cached(&self) -> Option<T> {
        self.view()
    }

    pub(crate) fn begin_fetch(&mut self, arg: Option<String>) -> u64 {
        if self.arg != arg {
            if !self.config.keep_previous_data {
                self.committed = None;
                self.last_fetched = None;
            }
            self.arg = arg;
        }
        self.fetch_seq += 1;
        self.fetching = true;
        self.status = QueryStatus::Loading;
        self.error = None;
        self.publish();
        self.fetch_seq
    }

    /// Apply a fetch result as the new committed base. Returns `false` when a
    /// newer fetch has started since `seq` was issued.
    pub(crate) fn finish_fetch(
        &mut self,
        seq: u64,
        result: Result<T, SharedError>,
        now: DateTime<Utc>,
    ) -> bool {
        if seq != self.fetch_seq {
            return false;
        }
        self.fetching = false;
        self.last_active = now;
        match result {
            Ok(value) => {
                self.committed = Some(value);
                self.last_fetched = Some(now);
                self.invalidated = false;
                self.error = None;
                self.status = self.settled_status();
            }
            Err(err) => {
                self.status = QueryStatus::Error;
                self.error = Some(err);
            }
        }
        self.publish();
        true
    }

    pub(crate) fn push_overlay(&mut self, id: u64, overlay: Overlay<T>, now: DateTime<Utc>) {
        self.overlays.push((id, overlay));
        self.status = QueryStatus::Loading;
        self.last_active = now;
        self.publish();
        tracing::debug!(key = self.key, ticket = id, pending = self.overlays.len(), "optimistic overlay applied");
    }

    fn take_overlay(&mut self, id: u64) -> bool {
        match self.overlays.iter().position(|(pending, _)| *pending == id) {
            Some(index) => {
                self.overlays.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn commit(&mut self, id: u64, commit: Commit<T>, now: DateTime<Utc>) -> bool {
        if !self.take_overlay(id) {
            return false;
        }
        self.committed = commit.apply(self.committed.take());
        self.last_fetched = Some(now);
        self.last_active = now;
        self.error = None;
        self.status = self.settled_status();
        self.publish();
        tracing::debug!(key = self.key, ticket = id, status = self.status.as_str(), "mutation committed");
        true
    }

    pub(crate) fn rollback(&mut self, id: u64, err: SharedError, now: DateTime<Utc>) -> bool {
        if !self.take_overlay(id) {
            return false;
        }
        self.last_active = now;
        self.status = QueryStatus::Error;
        tracing::debug!(key = self.key, ticket = id, error = %err, "mutation rolled back");
        self.error = Some(err);
        self.publish();
        true
    }
}

impl<T> ErasedEntry for Entry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn is_evictable(&self, now: DateTime<Utc>) -> bool {
        self.tx.receiver_count() == 0
            && !self.fetching
            && self.overlays.is_empty()
            && is_past_window(Some(self.last_active), self.config.cache_time, now)
    }

    fn mark_stale(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == QueryStatus::Fresh
            && is_past_window(self.last_fetched, self.config.stale_time, now)
        {
            self.status = QueryStatus::Stale;
            self.publish();
            return true;
        }
        false
    }

    fn invalidate(&mut self) {
        self.invalidated = true;
        if self.status == QueryStatus::Fresh {
            self.status = QueryStatus::Stale;
            self.publish();
        }
    }

    fn refetches_on_focus(&self) -> bool {
        self.config.refetch_on_window_focus
    }
}
