//! Per-query configuration.

use std::time::Duration;

/// Configuration attached to a query entry.
///
/// The most recent `query` call for a key decides the entry's config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long an entry survives with no subscribers before it is evicted.
    pub cache_time: Duration,
    /// How long fetched data counts as fresh; fresh data is served without
    /// refetching.
    pub stale_time: Duration,
    /// Whether regaining window focus invalidates the entry.
    pub refetch_on_window_focus: bool,
    /// Whether the previous value stays visible while a query with a new
    /// argument is loading.
    pub keep_previous_data: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cache_time: Duration::from_secs(30),
            stale_time: Duration::from_secs(5),
            refetch_on_window_focus: false,
            keep_previous_data: true,
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_time(mut self, duration: Duration) -> Self {
        self.cache_time = duration;
        self
    }

    pub fn with_stale_time(mut self, duration: Duration) -> Self {
        self.stale_time = duration;
        self
    }

    pub fn with_refetch_on_window_focus(mut self, enabled: bool) -> Self {
        self.refetch_on_window_focus = enabled;
        self
    }

    pub fn with_keep_previous_data(mut self, enabled: bool) -> Self {
        self.keep_previous_data = enabled;
        self
    }
}
