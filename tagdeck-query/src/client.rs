//! The query client: keyed store plus the read and mutation primitives.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::QueryConfig;
use crate::entry::{Entry, ErasedEntry};
use crate::error::{QueryError, QueryResult, SharedError};
use crate::freshness::QuerySnapshot;
use crate::key::QueryKey;
use crate::mutation::{Commit, MutationTicket};

/// Outcome of a [`QueryClient::sweep`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries that moved from fresh to stale.
    pub staled: usize,
    /// Entries dropped for having no subscribers past their cache time.
    pub evicted: usize,
}

#[derive(Default)]
struct Store {
    entries: HashMap<&'static str, Box<dyn ErasedEntry>>,
    next_ticket: u64,
}

impl Store {
    fn entry<T>(
        &mut self,
        key: &QueryKey<T>,
        config: &QueryConfig,
        now: DateTime<Utc>,
    ) -> QueryResult<&mut Entry<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let name = key.name();
        self.entries
            .entry(name)
            .or_insert_with(|| Box::new(Entry::<T>::new(name, config.clone(), now)) as Box<dyn ErasedEntry>)
            .as_any_mut()
            .downcast_mut::<Entry<T>>()
            .ok_or(QueryError::TypeMismatch { key: name })
    }
}

enum Plan<T> {
    Ready(T),
    Wait(watch::Receiver<QuerySnapshot<T>>),
    Fetch(u64),
}

/// Shared handle to the keyed store.
///
/// Cloning is cheap; all clones see the same entries. Entry state is only
/// changed through the methods below.
#[derive(Clone)]
pub struct QueryClient {
    store: Arc<Mutex<Store>>,
    defaults: QueryConfig,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryClient {
    /// `defaults` applies to entries created by `subscribe` or a mutation
    /// before any `query` call configured them.
    pub fn new(defaults: QueryConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            defaults,
        }
    }

    pub fn defaults(&self) -> &QueryConfig {
        &self.defaults
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read `key`, fetching when there is no data or the data is stale.
    ///
    /// If a fetch for the key is already in flight the call waits for it
    /// instead of starting another.
    pub async fn query<T, F, Fut, E>(
        &self,
        key: &QueryKey<T>,
        fetcher: F,
        config: QueryConfig,
    ) -> QueryResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + Send + Sync + 'static,
    {
        self.run(key, None, fetcher, config).await
    }

    /// Like [`query`](Self::query), for an entry whose value depends on an
    /// argument. A different argument than the one the data was fetched for
    /// always refetches; `keep_previous_data` decides whether the old value
    /// stays visible meanwhile.
    pub async fn query_with_arg<T, A, F, Fut, E>(
        &self,
        key: &QueryKey<T>,
        arg: A,
        fetcher: F,
        config: QueryConfig,
    ) -> QueryResult<T>
    where
        T: Clone + Send + Sync + 'static,
        A: ToString,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + Send + Sync + 'static,
    {
        let arg_key = Some(arg.to_string());
        self.run(key, arg_key, move || fetcher(arg), config).await
    }

    async fn run<T, F, Fut, E>(
        &self,
        key: &QueryKey<T>,
        arg: Option<String>,
        fetcher: F,
        config: QueryConfig,
    ) -> QueryResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + Send + Sync + 'static,
    {
        let now = Utc::now();
        let plan = {
            let mut store = self.lock();
            let entry = store.entry(key, &config, now)?;
            entry.config = config;
            entry.touch(now);
            if entry.is_fetching_for(&arg) {
                Plan::Wait(entry.subscribe())
            } else {
                match (entry.needs_fetch(&arg, now), entry.cached()) {
                    (false, Some(value)) => Plan::Ready(value),
                    _ => Plan::Fetch(entry.begin_fetch(arg.clone())),
                }
            }
        };

        match plan {
            Plan::Ready(value) => Ok(value),
            Plan::Wait(mut rx) => {
                // A fetch for another argument replaces the one being waited on.
                let snapshot = match rx.wait_for(|s| !s.fetching || s.arg != arg).await {
                    Ok(snapshot) => snapshot.clone(),
                    Err(_) => return Err(QueryError::Unavailable { key: key.name() }),
                };
                if snapshot.arg != arg {
                    return Err(QueryError::Unavailable { key: key.name() });
                }
                match (snapshot.data, snapshot.error) {
                    (_, Some(source)) if snapshot.status.is_settled() => {
                        Err(QueryError::Fetch {
                            key: key.name(),
                            source,
                        })
                    }
                    (Some(value), _) => Ok(value),
                    (None, _) => Err(QueryError::Unavailable { key: key.name() }),
                }
            }
            Plan::Fetch(seq) => {
                tracing::debug!(key = key.name(), arg = ?arg, "fetch started");
                let result = fetcher().await.map_err(|e| Arc::new(e) as SharedError);
                let now = Utc::now();
                // Pending overlays apply to fetched data as well.
                let view = {
                    let mut store = self.lock();
                    match store.entry(key, &self.defaults, now) {
                        Ok(entry) => {
                            if entry.finish_fetch(seq, result.clone(), now) {
                                entry.cached()
                            } else {
                                tracing::debug!(key = key.name(), "superseded fetch result dropped");
                                None
                            }
                        }
                        Err(_) => None,
                    }
                };
                match &result {
                    Ok(_) => tracing::debug!(key = key.name(), "fetch finished"),
                    Err(err) => tracing::warn!(key = key.name(), error = %err, "fetch failed"),
                }
                result
                    .map(|fetched| view.unwrap_or(fetched))
                    .map_err(|source| QueryError::Fetch {
                        key: key.name(),
                        source,
                    })
            }
        }
    }

    /// Live view of `key`. The receiver holds the entry alive against
    /// eviction for as long as it exists.
    pub fn subscribe<T>(&self, key: &QueryKey<T>) -> QueryResult<watch::Receiver<QuerySnapshot<T>>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Utc::now();
        let mut store = self.lock();
        let defaults = self.defaults.clone();
        let entry = store.entry(key, &defaults, now)?;
        entry.touch(now);
        Ok(entry.subscribe())
    }

    /// Current state of `key`; an idle, empty snapshot if it does not exist.
    pub fn snapshot<T>(&self, key: &QueryKey<T>) -> QueryResult<QuerySnapshot<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let store = self.lock();
        match store.entries.get(key.name()) {
            None => Ok(QuerySnapshot::default()),
            Some(slot) => slot
                .as_any()
                .downcast_ref::<Entry<T>>()
                .map(Entry::snapshot)
                .ok_or(QueryError::TypeMismatch { key: key.name() }),
        }
    }

    /// Overlay `transform` onto `key` immediately. The overlay stays applied,
    /// replayed over every new committed value, until the returned ticket is
    /// settled.
    pub fn mutate_optimistic<T, F>(
        &self,
        key: &QueryKey<T>,
        transform: F,
    ) -> QueryResult<MutationTicket<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let now = Utc::now();
        let mut store = self.lock();
        store.next_ticket += 1;
        let id = store.next_ticket;
        let defaults = self.defaults.clone();
        let entry = store.entry(key, &defaults, now)?;
        entry.push_overlay(id, Arc::new(transform), now);
        Ok(MutationTicket::new(*key, id))
    }

    /// Commit: drop the ticket's overlay and install the authoritative value.
    pub fn mutate_success<T>(&self, ticket: MutationTicket<T>, commit: Commit<T>) -> QueryResult<()>
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = ticket.key();
        let now = Utc::now();
        let mut store = self.lock();
        let defaults = self.defaults.clone();
        let entry = store.entry(&key, &defaults, now)?;
        if entry.commit(ticket.id(), commit, now) {
            Ok(())
        } else {
            Err(QueryError::UnknownTicket {
                key: key.name(),
                ticket: ticket.id(),
            })
        }
    }

    /// Rollback: drop the ticket's overlay and put the entry in error.
    pub fn mutate_error<T, E>(&self, ticket: MutationTicket<T>, error: E) -> QueryResult<()>
    where
        T: Clone + Send + Sync + 'static,
        E: StdError + Send + Sync + 'static,
    {
        let key = ticket.key();
        let now = Utc::now();
        let mut store = self.lock();
        let defaults = self.defaults.clone();
        let entry = store.entry(&key, &defaults, now)?;
        if entry.rollback(ticket.id(), Arc::new(error), now) {
            Ok(())
        } else {
            Err(QueryError::UnknownTicket {
                key: key.name(),
                ticket: ticket.id(),
            })
        }
    }

    /// Force the next `query` for `key` to refetch.
    pub fn invalidate<T>(&self, key: &QueryKey<T>) {
        if let Some(entry) = self.lock().entries.get_mut(key.name()) {
            entry.invalidate();
        }
    }

    /// Invalidate every entry configured with `refetch_on_window_focus`.
    /// Returns how many were invalidated.
    pub fn window_focused(&self) -> usize {
        let mut store = self.lock();
        let mut count = 0;
        for entry in store.entries.values_mut() {
            if entry.refetches_on_focus() {
                entry.invalidate();
                count += 1;
            }
        }
        count
    }

    /// Move fresh entries past their window to stale and evict unobserved
    /// entries past their cache time.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut store = self.lock();
        let mut report = SweepReport::default();
        for entry in store.entries.values_mut() {
            if entry.mark_stale(now) {
                report.staled += 1;
            }
        }
        let before = store.entries.len();
        store.entries.retain(|_, entry| !entry.is_evictable(now));
        report.evicted = before - store.entries.len();
        if report.evicted > 0 {
            tracing::debug!(evicted = report.evicted, "query entries evicted");
        }
        report
    }

    pub fn contains<T>(&self, key: &QueryKey<T>) -> bool {
        self.lock().entries.contains_key(key.name())
    }
}
