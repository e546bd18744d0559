//! Provides a cache that is _not_ thread-safe, for single-threaded owners.

mod builder;
mod cache;
mod invalidators;
mod iter;

use std::rc::Rc;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use iter::Iter;

use crate::common::{time::Instant, Tags};

pub(crate) struct ValueEntry<V> {
    pub(crate) name: Rc<str>,
    pub(crate) payload: V,
    pub(crate) invalidators: Tags,
    pub(crate) last_update: Instant,
}

impl<V> ValueEntry<V> {
    pub(crate) fn new(name: Rc<str>, payload: V, invalidators: Tags, last_update: Instant) -> Self {
        Self {
            name,
            payload,
            invalidators,
            last_update,
        }
    }

    #[inline]
    pub(crate) fn has_invalidator(&self, tag: &str) -> bool {
        self.invalidators.iter().any(|t| **t == *tag)
    }
}
