#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! Tagcache is an in-process object cache whose entries are evicted by shared
//! _invalidator tags_ rather than one by one.
//!
//! Every cached entry has a unique name, a payload, and a non-empty set of
//! invalidator tags. Invalidating a tag evicts every entry that subscribed to it.
//! The cache keeps three structures consistent across all operations:
//!
//! - the entry store, holding the entries themselves,
//! - the name index, mapping an entry name to its slot in the store,
//! - the invalidator index, mapping a tag to the names subscribed to it.
//!
//! # Example
//!
//! ```rust
//! use tagcache::{unsync::Cache, CacheSetup};
//!
//! let mut cache = Cache::new();
//!
//! cache
//!     .add(CacheSetup::new("user:1").invalidators(["users", "org:7"]).payload("alice"))
//!     .unwrap();
//! cache
//!     .add(CacheSetup::new("user:2").invalidators(["users"]).payload("bob"))
//!     .unwrap();
//! cache
//!     .add(CacheSetup::new("org:7").invalidators(["org:7"]).payload("acme"))
//!     .unwrap();
//!
//! assert_eq!(cache.get("user:1"), Some(&"alice"));
//!
//! // Evicts "user:1" and "org:7", which both subscribed to the tag.
//! assert_eq!(cache.invalidate("org:7"), Ok(2));
//! assert_eq!(cache.get("user:1"), None);
//! assert_eq!(cache.get("user:2"), Some(&"bob"));
//! ```
//!
//! # Thread safety
//!
//! The cache is single-threaded. It is neither `Send` nor `Sync`; a
//! multi-threaded host must own it behind its own lock.
//!
//! # Crate features
//!
//! - `quanta` (default): takes entry timestamps from the `quanta` crate's clock.
//! - `logging`: emits diagnostics through the `log` facade. Rejected calls are
//!   logged at `warn`, internal consistency problems at `error`.

pub mod notification;
pub mod unsync;

pub(crate) mod common;

pub use common::{
    entry::EntryRef,
    error::{CacheError, ConsistencyError, Result, UsageError},
    setup::CacheSetup,
    time::Instant,
};
