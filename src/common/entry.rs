use super::time::Instant;

use std::{fmt::Debug, rc::Rc};

/// A borrowed view of a single entry in the cache.
///
/// `EntryRef` is returned by the [`get_entry`][get-entry-method] method of the
/// cache. Besides the payload, it gives access to the entry's invalidator tags
/// and to the time of its last write (`add`, `update` or a change of its
/// invalidators).
///
/// [get-entry-method]: ./unsync/struct.Cache.html#method.get_entry
pub struct EntryRef<'a, V> {
    name: &'a str,
    payload: &'a V,
    invalidators: &'a [Rc<str>],
    last_update: Instant,
}

impl<V> Debug for EntryRef<'_, V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRef")
            .field("name", &self.name)
            .field("payload", self.payload)
            .field("invalidators", &self.invalidators)
            .field("last_update", &self.last_update)
            .finish()
    }
}

impl<'a, V> EntryRef<'a, V> {
    pub(crate) fn new(
        name: &'a str,
        payload: &'a V,
        invalidators: &'a [Rc<str>],
        last_update: Instant,
    ) -> Self {
        Self {
            name,
            payload,
            invalidators,
            last_update,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn payload(&self) -> &'a V {
        self.payload
    }

    /// Returns the invalidator tags of the entry in the order they were given.
    pub fn invalidators(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.invalidators.iter().map(|tag| &**tag)
    }

    pub fn has_invalidator(&self, tag: &str) -> bool {
        self.invalidators.iter().any(|t| **t == *tag)
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }
}
