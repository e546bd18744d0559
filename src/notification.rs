//! Support for eviction listeners.
//!
//! An eviction listener is a closure set on a cache at build time with
//! [`CacheBuilder::eviction_listener`][listener-method]. The cache calls it with
//! the name and the payload of every entry that leaves the cache, together with
//! the [`RemovalCause`][removal-cause].
//!
//! [listener-method]: ../unsync/struct.CacheBuilder.html#method.eviction_listener
//! [removal-cause]: ./enum.RemovalCause.html

pub(crate) mod notifier;

use std::rc::Rc;

pub(crate) type EvictionListener<V> = Box<dyn FnMut(Rc<str>, V, RemovalCause) + 'static>;

/// Indicates the reason why a cached entry was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalCause {
    /// The entry was manually removed by the user.
    Explicit,
    /// One of the entry's invalidator tags was invalidated.
    Invalidated,
    /// The entry itself was not actually removed, but its payload was replaced by
    /// an update.
    Replaced,
    /// All entries were dropped by `invalidate_all`.
    Cleared,
}

impl RemovalCause {
    /// Returns `true` if the entry left the cache because of a tag invalidation.
    pub fn was_invalidated(&self) -> bool {
        matches!(self, Self::Invalidated)
    }
}
