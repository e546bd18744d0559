use super::Cache;
use crate::notification::{EvictionListener, RemovalCause};

use std::{
    collections::hash_map::RandomState,
    hash::BuildHasher,
    marker::PhantomData,
    rc::Rc,
};

/// Builds a [`Cache`][cache-struct] with various configuration knobs.
///
/// [cache-struct]: ./struct.Cache.html
///
/// # Examples
///
/// ```rust
/// use tagcache::{notification::RemovalCause, unsync::Cache, CacheSetup};
///
/// use std::{cell::RefCell, rc::Rc};
///
/// let evicted = Rc::new(RefCell::new(Vec::new()));
/// let evicted1 = Rc::clone(&evicted);
///
/// let mut cache = Cache::builder()
///     // Prefixes the log messages of this cache.
///     .name("sessions")
///     .initial_capacity(100)
///     .eviction_listener(move |name, _payload: u32, cause| {
///         evicted1.borrow_mut().push((name.to_string(), cause));
///     })
///     .build();
///
/// cache.add(CacheSetup::new("s1").invalidators(["user:1"]).payload(1)).unwrap();
/// cache.invalidate("user:1").unwrap();
///
/// assert_eq!(
///     *evicted.borrow(),
///     vec![("s1".to_string(), RemovalCause::Invalidated)]
/// );
/// ```
///
#[must_use]
pub struct CacheBuilder<V, C> {
    name: Option<String>,
    initial_capacity: Option<usize>,
    eviction_listener: Option<EvictionListener<V>>,
    cache_type: PhantomData<C>,
}

impl<V> Default for CacheBuilder<V, Cache<V, RandomState>> {
    fn default() -> Self {
        Self {
            name: None,
            initial_capacity: None,
            eviction_listener: None,
            cache_type: PhantomData,
        }
    }
}

impl<V> CacheBuilder<V, Cache<V, RandomState>> {
    /// Construct a new `CacheBuilder` that will be used to build a `Cache`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `Cache<V>`.
    pub fn build(self) -> Cache<V, RandomState> {
        let build_hasher = RandomState::default();
        Cache::with_everything(
            self.name,
            self.initial_capacity,
            build_hasher,
            self.eviction_listener,
        )
    }

    /// Builds a `Cache<V, S>`, with the given `hasher`. The hasher is used by both
    /// the name index and the invalidator index.
    pub fn build_with_hasher<S>(self, hasher: S) -> Cache<V, S>
    where
        S: BuildHasher + Clone,
    {
        Cache::with_everything(
            self.name,
            self.initial_capacity,
            hasher,
            self.eviction_listener,
        )
    }
}

impl<V, C> CacheBuilder<V, C> {
    /// Sets the name of the cache. Currently the name is used only to prefix the
    /// log messages of the cache.
    pub fn name(self, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the initial capacity (number of entries) of the cache.
    pub fn initial_capacity(self, number_of_entries: usize) -> Self {
        Self {
            initial_capacity: Some(number_of_entries),
            ..self
        }
    }

    /// Sets the eviction listener closure to the cache.
    ///
    /// The closure is called with the name and the payload of every entry leaving
    /// the cache, and with the [`RemovalCause`][removal-cause]. An update calls it
    /// with the replaced payload.
    ///
    /// # Panics
    ///
    /// If the closure panics, the panic is caught and the cache stops calling the
    /// listener. The cache itself stays usable. With the `logging` feature, the
    /// panic is logged at the `error` level.
    ///
    /// [removal-cause]: ../notification/enum.RemovalCause.html
    pub fn eviction_listener(
        self,
        listener: impl FnMut(Rc<str>, V, RemovalCause) + 'static,
    ) -> Self {
        Self {
            eviction_listener: Some(Box::new(listener)),
            ..self
        }
    }
}
