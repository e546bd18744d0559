/// A `Result` whose error is a [`CacheError`][cache-error].
///
/// [cache-error]: ./enum.CacheError.html
pub type Result<T, E = CacheError> = std::result::Result<T, E>;

/// The error returned by the mutating methods of
/// [`unsync::Cache`][cache-struct].
///
/// A failed call never leaves partial state behind, with one exception: an
/// [`invalidate`][invalidate-method] call that hits a
/// [`ConsistencyError`][consistency-error] keeps the evictions it performed
/// before the problem was found.
///
/// [cache-struct]: ./unsync/struct.Cache.html
/// [invalidate-method]: ./unsync/struct.Cache.html#method.invalidate
/// [consistency-error]: ./enum.ConsistencyError.html
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The caller asked for something the cache cannot do. The cache state was
    /// not changed.
    #[error("invalid cache operation: {0}")]
    Usage(#[from] UsageError),
    /// The internal indexes of the cache disagree with each other.
    #[error("cache indexes are inconsistent: {0}")]
    Consistency(#[from] ConsistencyError),
}

impl CacheError {
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Consistency(_))
    }
}

/// A call rejected because of its arguments or because of the current contents
/// of the cache.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("no payload was given")]
    MissingPayload,
    #[error("no name was given")]
    MissingName,
    #[error("the name must not be empty")]
    EmptyName,
    #[error("no invalidators were given")]
    MissingInvalidators,
    #[error("an entry cannot be cached without invalidators")]
    EmptyInvalidators,
    #[error("'{0}' is already cached")]
    AlreadyCached(String),
    #[error("'{0}' is not cached")]
    NotCached(String),
    #[error("'{0}' is not a registered invalidator")]
    UnknownInvalidator(String),
    /// Removing the given invalidators would leave the entry with none, and an
    /// entry without invalidators could never be evicted by a tag.
    #[error("removing these invalidators would leave '{0}' without any")]
    WouldOrphanEntry(String),
}

/// A violation of the cache's internal invariants.
///
/// These are never caused by the arguments of the failing call; they signal
/// that an earlier operation left the indexes out of sync. The cache does not
/// try to repair itself. Use
/// [`Cache::verify_integrity`][verify-integrity] to audit it.
///
/// [verify-integrity]: ./unsync/struct.Cache.html#method.verify_integrity
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("'{0}' is subscribed to an invalidator but is not cached")]
    MissingEntry(String),
    #[error("the name index points '{name}' at a slot holding '{found}'")]
    MisplacedEntry { name: String, found: String },
    #[error("the name index points '{0}' at an empty slot")]
    DanglingSlot(String),
    #[error("'{0}' is stored in a slot the name index does not point to")]
    UnindexedEntry(String),
    #[error("'{0}' is cached without invalidators")]
    EntryWithoutInvalidators(String),
    #[error("invalidator '{tag}' and entry '{name}' disagree on their subscription")]
    IndexMismatch { tag: String, name: String },
    #[error("invalidator '{0}' is registered without subscribers")]
    EmptyInvalidatorSet(String),
}
