use super::{
    invalidators::{InvalidatorIndex, Subscribers},
    CacheBuilder, Iter, ValueEntry,
};
use crate::{
    common::{
        self,
        entry::EntryRef,
        error::{CacheError, ConsistencyError, Result, UsageError},
        setup::CacheSetup,
        time::{Clock, Instant},
        Tags,
    },
    notification::{notifier::RemovalNotifier, EvictionListener, RemovalCause},
};

use std::{
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::BuildHasher,
    mem,
    rc::Rc,
};

// A slot of the entry store. `None` marks a slot vacated by a removal.
type Slot<V> = Option<ValueEntry<V>>;

/// An in-memory cache whose entries are evicted by invalidator tags. It is _not_
/// thread-safe.
///
/// Each entry has a unique name, a payload and one or more invalidator tags.
/// Entries are never evicted on their own: they stay cached until they are
/// removed by name, or until one of their tags is invalidated.
///
/// `Cache` keeps its entries in a slot arena (the entry store), in insertion
/// order. A name index maps each name to its slot, and an invalidator index maps each tag to the names
/// subscribed to it. Lookups by name and removals cost O(1), and invalidating a
/// tag costs O(k) in the number of its subscribers.
///
/// # Examples
///
/// ```rust
/// use tagcache::{unsync::Cache, CacheError, CacheSetup, UsageError};
///
/// let mut cache = Cache::new();
///
/// cache
///     .add(CacheSetup::new("a").invalidators(["t1", "t2"]).payload(1))
///     .unwrap();
/// cache
///     .add(CacheSetup::new("b").invalidators(["t2"]).payload(2))
///     .unwrap();
///
/// // Adding never overwrites.
/// let result = cache.add(CacheSetup::new("a").invalidators(["t3"]).payload(3));
/// assert_eq!(
///     result,
///     Err(CacheError::Usage(UsageError::AlreadyCached("a".into())))
/// );
///
/// // Updating replaces the payload and the invalidators.
/// cache
///     .update(CacheSetup::new("a").invalidators(["t3"]).payload(10))
///     .unwrap();
/// assert_eq!(cache.get("a"), Some(&10));
///
/// // "a" is no longer subscribed to "t2".
/// assert_eq!(cache.invalidate("t2"), Ok(1));
/// assert_eq!(cache.get("a"), Some(&10));
/// assert_eq!(cache.get("b"), None);
/// ```
///
/// # Errors
///
/// Mutating methods return a [`CacheError`][cache-error]. A
/// [`UsageError`][usage-error] means the call was rejected and changed nothing. A
/// [`ConsistencyError`][consistency-error] means the internal indexes disagree
/// because of an earlier bug.
///
/// [cache-error]: ../enum.CacheError.html
/// [usage-error]: ../enum.UsageError.html
/// [consistency-error]: ../enum.ConsistencyError.html
pub struct Cache<V, S = RandomState> {
    name: Option<String>,
    entries: Vec<Slot<V>>,
    vacant_slots: usize,
    name_index: HashMap<Rc<str>, usize, S>,
    invalidators: InvalidatorIndex<S>,
    notifier: Option<RemovalNotifier<V>>,
    clock: Clock,
}

impl<V, S> fmt::Debug for Cache<V, S>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d_map = f.debug_map();

        for (name, payload) in Iter::new(self.entries.iter()) {
            d_map.entry(&name, payload);
        }

        d_map.finish()
    }
}

impl<V> Default for Cache<V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Cache<V, RandomState> {
    /// Constructs a new, empty `Cache<V>`.
    ///
    /// To set a name, an initial capacity or an eviction listener, use the
    /// [`CacheBuilder`][builder-struct].
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn new() -> Self {
        let build_hasher = RandomState::default();
        Self::with_everything(None, None, build_hasher, None)
    }

    /// Returns a [`CacheBuilder`][builder-struct], which can builds a `Cache` with
    /// various configuration knobs.
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn builder() -> CacheBuilder<V, Cache<V, RandomState>> {
        CacheBuilder::default()
    }
}

//
// public
//
impl<V, S> Cache<V, S>
where
    S: BuildHasher + Clone,
{
    pub(crate) fn with_everything(
        name: Option<String>,
        initial_capacity: Option<usize>,
        build_hasher: S,
        eviction_listener: Option<EvictionListener<V>>,
    ) -> Self {
        let capacity = initial_capacity.unwrap_or_default();
        let notifier = eviction_listener.map(|l| RemovalNotifier::new(l, name.clone()));

        Self {
            name,
            entries: Vec::with_capacity(capacity),
            vacant_slots: 0,
            name_index: HashMap::with_capacity_and_hasher(capacity, build_hasher.clone()),
            invalidators: InvalidatorIndex::with_capacity_and_hasher(capacity, build_hasher),
            notifier,
            clock: Clock::new(),
        }
    }

    /// Returns cache’s name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Adds a new entry described by `setup`.
    ///
    /// Fails with a `UsageError` if the setup does not validate, or if an entry
    /// with the same name is already cached. An existing entry is never
    /// overwritten; use [`update`](#method.update) for that.
    pub fn add(&mut self, setup: CacheSetup<V>) -> Result<()> {
        let (name, tags, payload) = match setup.into_parts() {
            Ok(parts) => parts,
            Err(e) => return self.fail("add", e),
        };
        if self.name_index.contains_key(name.as_str()) {
            return self.fail("add", UsageError::AlreadyCached(name));
        }

        let name: Rc<str> = Rc::from(name);
        let entry = ValueEntry::new(Rc::clone(&name), payload, tags, self.now());
        self.invalidators.register(&name, &entry.invalidators);
        let slot = self.store(entry);
        self.name_index.insert(name, slot);

        #[cfg(feature = "logging")]
        self.trace("add", &self.entries[slot]);

        Ok(())
    }

    /// Replaces the payload and the invalidators of a cached entry.
    ///
    /// The entry keeps its slot. Only the tags that differ between the old and
    /// the new invalidators are touched in the invalidator index. The replaced
    /// payload is passed to the eviction listener with
    /// [`RemovalCause::Replaced`][replaced].
    ///
    /// Fails with a `UsageError` if the setup does not validate, or if no entry
    /// with that name is cached.
    ///
    /// [replaced]: ../notification/enum.RemovalCause.html#variant.Replaced
    pub fn update(&mut self, setup: CacheSetup<V>) -> Result<()> {
        let (name, tags, payload) = match setup.into_parts() {
            Ok(parts) => parts,
            Err(e) => return self.fail("update", e),
        };
        let slot = match self.name_index.get(name.as_str()) {
            Some(&slot) => slot,
            None => return self.fail("update", UsageError::NotCached(name)),
        };

        let now = self.now();
        let entry = match Self::slot_mut(&mut self.entries, slot, &name) {
            Ok(entry) => entry,
            Err(e) => return self.fail("update", e),
        };

        let old_tags = mem::replace(&mut entry.invalidators, tags);
        let old_payload = mem::replace(&mut entry.payload, payload);
        entry.last_update = now;
        self.invalidators
            .retag(&entry.name, &old_tags, &entry.invalidators);
        let name = Rc::clone(&entry.name);

        #[cfg(feature = "logging")]
        self.trace("update", &self.entries[slot]);

        self.notify(name, old_payload, RemovalCause::Replaced);
        Ok(())
    }

    /// Removes the entry named `name`, retracting its subscriptions from the
    /// invalidator index.
    ///
    /// Fails with a `UsageError` if no entry with that name is cached.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if !self.name_index.contains_key(name) {
            return self.fail("remove", UsageError::NotCached(name.into()));
        }

        match self.detach(name) {
            Ok(entry) => {
                self.notify(entry.name, entry.payload, RemovalCause::Explicit);
                Ok(())
            }
            Err(e) => self.fail("remove", e),
        }
    }

    /// Evicts every entry subscribed to the invalidator `tag`, and returns the
    /// number of evicted entries.
    ///
    /// Each evicted entry is unsubscribed from all of its invalidators, not only
    /// from `tag`. Tags left without subscribers disappear, so invalidating them
    /// afterwards fails.
    ///
    /// Entries are evicted one by one in subscription order. If a subscribed name
    /// turns out not to be cached, the method stops and returns a
    /// `ConsistencyError`. Entries evicted before that point stay evicted.
    ///
    /// Fails with a `UsageError` if no cached entry is subscribed to `tag`.
    pub fn invalidate(&mut self, tag: &str) -> Result<usize> {
        let names: Subscribers = match self.invalidators.snapshot(tag) {
            Some(names) => names,
            None => return self.fail("invalidate", UsageError::UnknownInvalidator(tag.into())),
        };

        let mut evicted = 0;
        for name in names {
            let entry = match self.detach(&name) {
                Ok(entry) => entry,
                Err(e) => return self.fail("invalidate", e),
            };
            // Also covers a subscription the entry itself does not list.
            self.invalidators.unsubscribe(tag, &name);
            evicted += 1;

            #[cfg(feature = "logging")]
            log::trace!("{}Cache::invalidate : '{tag}' evicted '{name}'", self.log_prefix());

            self.notify(entry.name, entry.payload, RemovalCause::Invalidated);
        }

        Ok(evicted)
    }

    /// Returns a reference to the payload of the entry named `name`.
    ///
    /// If the name index points at a slot holding another entry, the mismatch is
    /// logged (with the `logging` feature) and `None` is returned.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.lookup("get", name).map(|entry| &entry.payload)
    }

    /// Returns a view of the entry named `name`, including its invalidators and
    /// the time of its last update.
    pub fn get_entry(&self, name: &str) -> Option<EntryRef<'_, V>> {
        self.lookup("get_entry", name).map(|entry| {
            EntryRef::new(
                &entry.name,
                &entry.payload,
                &entry.invalidators,
                entry.last_update,
            )
        })
    }

    /// Returns a fresh map from the name to a clone of the payload of every cached
    /// entry.
    pub fn get_all(&self) -> HashMap<String, V>
    where
        V: Clone,
    {
        self.iter()
            .map(|(name, payload)| (name.to_string(), payload.clone()))
            .collect()
    }

    /// Returns `true` if an entry named `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Returns the number of cached entries.
    pub fn entry_count(&self) -> u64 {
        self.name_index.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.name_index.is_empty()
    }

    /// Returns the invalidators of the entry named `name`, in the order they were
    /// given.
    pub fn invalidators_of<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        self.lookup("invalidators_of", name)
            .map(|entry| entry.invalidators.iter().map(|tag| &**tag))
    }

    /// Returns the names of the entries subscribed to `tag`, in subscription
    /// order.
    pub fn names_for<'a>(&'a self, tag: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        self.invalidators
            .subscribers(tag)
            .map(|names| names.iter().map(|name| &**name))
    }

    /// Returns `true` if at least one cached entry is subscribed to `tag`.
    pub fn has_invalidator(&self, tag: &str) -> bool {
        self.invalidators.contains(tag)
    }

    /// Returns the number of invalidators with at least one subscriber.
    pub fn invalidator_count(&self) -> usize {
        self.invalidators.len()
    }

    /// Subscribes the entry named `name` to more invalidators. Tags the entry
    /// already has are ignored.
    ///
    /// Fails with a `UsageError` if `tags` is empty or if no entry with that name
    /// is cached.
    pub fn add_invalidators<I, T>(&mut self, name: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags = common::to_tags(tags);
        if tags.is_empty() {
            return self.fail("add_invalidators", UsageError::EmptyInvalidators);
        }
        let slot = match self.name_index.get(name) {
            Some(&slot) => slot,
            None => return self.fail("add_invalidators", UsageError::NotCached(name.into())),
        };

        let now = self.now();
        let entry = match Self::slot_mut(&mut self.entries, slot, name) {
            Ok(entry) => entry,
            Err(e) => return self.fail("add_invalidators", e),
        };

        let added: Tags = tags
            .into_iter()
            .filter(|tag| !entry.invalidators.contains(tag))
            .collect();
        entry.invalidators.extend(added.iter().cloned());
        entry.last_update = now;
        self.invalidators.register(&entry.name, &added);

        Ok(())
    }

    /// Unsubscribes the entry named `name` from the given invalidators. Tags the
    /// entry does not have are ignored, and a call that removes nothing leaves
    /// the entry untouched.
    ///
    /// Fails with `UsageError::WouldOrphanEntry` if the entry would be left
    /// without invalidators, and with `UsageError::NotCached` if no entry with
    /// that name is cached.
    pub fn remove_invalidators<I, T>(&mut self, name: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags = common::to_tags(tags);
        let slot = match self.name_index.get(name) {
            Some(&slot) => slot,
            None => return self.fail("remove_invalidators", UsageError::NotCached(name.into())),
        };

        let now = self.now();
        let entry = match Self::slot_mut(&mut self.entries, slot, name) {
            Ok(entry) => entry,
            Err(e) => return self.fail("remove_invalidators", e),
        };

        let remaining: Tags = entry
            .invalidators
            .iter()
            .filter(|tag| !tags.contains(*tag))
            .cloned()
            .collect();
        if remaining.len() == entry.invalidators.len() {
            return Ok(());
        }
        if remaining.is_empty() {
            return self.fail(
                "remove_invalidators",
                UsageError::WouldOrphanEntry(name.into()),
            );
        }

        let old_tags = mem::replace(&mut entry.invalidators, remaining);
        entry.last_update = now;
        self.invalidators
            .retag(&entry.name, &old_tags, &entry.invalidators);

        Ok(())
    }

    /// Discards all cached entries and invalidators.
    ///
    /// The eviction listener is called for every entry with
    /// [`RemovalCause::Cleared`][cleared].
    ///
    /// [cleared]: ../notification/enum.RemovalCause.html#variant.Cleared
    pub fn invalidate_all(&mut self) {
        self.name_index.clear();
        self.invalidators.clear();
        self.vacant_slots = 0;

        let entries = mem::take(&mut self.entries);
        for entry in entries.into_iter().flatten() {
            self.notify(entry.name, entry.payload, RemovalCause::Cleared);
        }
    }

    /// Creates an iterator visiting all `(name, payload)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.entries.iter())
    }

    /// Audits the internal indexes of the cache.
    ///
    /// Rebuilds the expected state from the entry store and checks that:
    ///
    /// - every name index entry points at a slot holding an entry of that name,
    /// - every stored entry is indexed at its own slot, which also rules out
    ///   two entries sharing a name,
    /// - every stored entry has at least one invalidator,
    /// - every invalidator of an entry lists the entry's name exactly once,
    /// - every name listed under an invalidator belongs to a cached entry holding
    ///   that invalidator, and no invalidator is listed without subscribers.
    ///
    /// Run this before retrying an `invalidate` call that failed with a
    /// `ConsistencyError`.
    pub fn verify_integrity(&self) -> Result<(), ConsistencyError> {
        for (name, &slot) in &self.name_index {
            self.indexed_entry(name, slot)?;
        }

        for (slot, entry) in self.entries.iter().enumerate() {
            let entry = match entry {
                Some(entry) => entry,
                None => continue,
            };
            if self.name_index.get(&*entry.name) != Some(&slot) {
                return Err(ConsistencyError::UnindexedEntry(entry.name.to_string()));
            }
            if entry.invalidators.is_empty() {
                return Err(ConsistencyError::EntryWithoutInvalidators(
                    entry.name.to_string(),
                ));
            }
            for tag in &entry.invalidators {
                if self.invalidators.count_subscriptions(tag, &entry.name) != 1 {
                    return Err(ConsistencyError::IndexMismatch {
                        tag: tag.to_string(),
                        name: entry.name.to_string(),
                    });
                }
            }
        }

        for (tag, names) in self.invalidators.iter() {
            if names.is_empty() {
                return Err(ConsistencyError::EmptyInvalidatorSet(tag.to_string()));
            }
            for name in names {
                let subscribed = self
                    .name_index
                    .get(&**name)
                    .and_then(|&slot| self.indexed_entry(name, slot).ok())
                    .map(|entry| entry.has_invalidator(tag))
                    .unwrap_or_default();
                if !subscribed {
                    return Err(ConsistencyError::IndexMismatch {
                        tag: tag.to_string(),
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

//
// private
//
impl<V, S> Cache<V, S>
where
    S: BuildHasher + Clone,
{
    #[inline]
    fn now(&self) -> Instant {
        Instant::new(self.clock.now())
    }

    // Appends the entry to the store. Compacts the store first when at least
    // half of its slots are vacant.
    fn store(&mut self, entry: ValueEntry<V>) -> usize {
        if self.vacant_slots > 0 && self.vacant_slots * 2 >= self.entries.len() {
            self.compact();
        }
        self.entries.push(Some(entry));
        self.entries.len() - 1
    }

    // Drops the vacant slots, keeping the entries in order, and moves every name
    // index position along with its slot. A position that pointed at a vacant or
    // out of range slot keeps dangling.
    fn compact(&mut self) {
        let mut next = 0;
        let moved: Vec<Option<usize>> = self
            .entries
            .iter()
            .map(|slot| {
                slot.as_ref().map(|_| {
                    next += 1;
                    next - 1
                })
            })
            .collect();

        for slot in self.name_index.values_mut() {
            *slot = moved.get(*slot).copied().flatten().unwrap_or(usize::MAX);
        }
        self.entries.retain(Option::is_some);
        self.vacant_slots = 0;
    }

    fn indexed_entry(
        &self,
        name: &str,
        slot: usize,
    ) -> Result<&ValueEntry<V>, ConsistencyError> {
        match self.entries.get(slot) {
            Some(Some(entry)) if *entry.name == *name => Ok(entry),
            Some(Some(entry)) => Err(ConsistencyError::MisplacedEntry {
                name: name.into(),
                found: entry.name.to_string(),
            }),
            _ => Err(ConsistencyError::DanglingSlot(name.into())),
        }
    }

    fn slot_mut<'a>(
        entries: &'a mut [Slot<V>],
        slot: usize,
        name: &str,
    ) -> Result<&'a mut ValueEntry<V>, ConsistencyError> {
        match entries.get_mut(slot) {
            Some(Some(entry)) => {
                if *entry.name == *name {
                    Ok(entry)
                } else {
                    Err(ConsistencyError::MisplacedEntry {
                        name: name.into(),
                        found: entry.name.to_string(),
                    })
                }
            }
            _ => Err(ConsistencyError::DanglingSlot(name.into())),
        }
    }

    // Looks an entry up by name. A name index pointing at the wrong slot is
    // reported but not raised.
    fn lookup(&self, _op: &'static str, name: &str) -> Option<&ValueEntry<V>> {
        let slot = *self.name_index.get(name)?;
        match self.indexed_entry(name, slot) {
            Ok(entry) => Some(entry),
            Err(_e) => {
                #[cfg(feature = "logging")]
                log_failure(self.name(), _op, &_e.into());
                None
            }
        }
    }

    // Removes the entry from the store and from both indexes.
    fn detach(&mut self, name: &str) -> Result<ValueEntry<V>, ConsistencyError> {
        let slot = *self
            .name_index
            .get(name)
            .ok_or_else(|| ConsistencyError::MissingEntry(name.into()))?;
        self.indexed_entry(name, slot)?;

        let entry = self.entries[slot]
            .take()
            .ok_or_else(|| ConsistencyError::DanglingSlot(name.into()))?;
        self.vacant_slots += 1;
        self.name_index.remove(name);
        self.invalidators
            .unregister(&entry.name, Some(entry.invalidators.as_slice()));

        Ok(entry)
    }

    fn notify(&mut self, name: Rc<str>, payload: V, cause: RemovalCause) {
        if let Some(notifier) = &mut self.notifier {
            notifier.notify(name, payload, cause);
        }
    }

    fn fail<T>(&self, _op: &'static str, error: impl Into<CacheError>) -> Result<T> {
        let error = error.into();
        #[cfg(feature = "logging")]
        log_failure(self.name(), _op, &error);
        Err(error)
    }

    #[cfg(feature = "logging")]
    fn log_prefix(&self) -> String {
        self.name()
            .map(|name| format!("[{name}] "))
            .unwrap_or_default()
    }

    #[cfg(feature = "logging")]
    fn trace(&self, op: &str, slot: &Slot<V>) {
        if let Some(entry) = slot {
            log::trace!(
                "{}Cache::{op} : '{}' subscribed to {:?}",
                self.log_prefix(),
                entry.name,
                entry.invalidators
            );
        }
    }
}

//
// for testing
//
#[cfg(test)]
impl<V, S> Cache<V, S>
where
    S: BuildHasher + Clone,
{
    fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    fn slot_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }
}

//
// private free-standing functions
//
#[cfg(feature = "logging")]
fn log_failure(cache_name: Option<&str>, op: &str, error: &CacheError) {
    let cn = cache_name
        .map(|name| format!("[{name}] "))
        .unwrap_or_default();

    match error {
        CacheError::Usage(e) => log::warn!("{cn}Cache::{op} : {e}"),
        CacheError::Consistency(e) => {
            log::error!("{cn}Cache::{op} : {e}. The cache indexes are broken")
        }
    }
}
