//! Typed query keys.

use std::fmt;
use std::marker::PhantomData;

/// Name of a cache entry, tagged with the type of value stored under it.
///
/// Keys are usually declared as constants next to the code that owns them:
///
/// ```
/// use tagdeck_query::QueryKey;
///
/// const COUNTER: QueryKey<u64> = QueryKey::new("counter");
/// assert_eq!(COUNTER.name(), "counter");
/// ```
pub struct QueryKey<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> QueryKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for QueryKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for QueryKey<T> {}

impl<T> PartialEq for QueryKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for QueryKey<T> {}

impl<T> fmt::Debug for QueryKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QueryKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for QueryKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
