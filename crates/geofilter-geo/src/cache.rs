//! Bounded LRU cache of catalog lookups keyed by WKID.
//!
//! Concurrent callers may race on a miss and both consult the catalog; the
//! second insert simply refreshes the entry.

use geofilter_core::config::DEFAULT_CACHE_CAPACITY;
use geofilter_core::models::CatalogEntry;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

static SHARED: Lazy<Arc<WkidCache>> = Lazy::new(|| Arc::new(WkidCache::new(DEFAULT_CACHE_CAPACITY)));

/// Thread-safe WKID → catalog entry cache
#[derive(Debug)]
pub struct WkidCache {
    entries: Mutex<LruCache<u32, CatalogEntry>>,
}

impl WkidCache {
    /// Create a cache holding at most `capacity` entries (a zero capacity holds one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: Mutex::new(LruCache::new(capacity)) }
    }

    /// The process-wide cache behind [`SpatialReferenceResolver::with_defaults`].
    ///
    /// Entries are keyed by WKID alone, so this cache must only ever front the
    /// built-in catalog. Resolvers over any other catalog get their own cache.
    ///
    /// [`SpatialReferenceResolver::with_defaults`]: crate::resolver::SpatialReferenceResolver::with_defaults
    pub(crate) fn shared() -> Arc<WkidCache> {
        Arc::clone(&SHARED)
    }

    /// Look up a WKID, marking it most recently used
    pub fn get(&self, wkid: u32) -> Option<CatalogEntry> {
        self.entries.lock().get(&wkid).cloned()
    }

    pub fn insert(&self, wkid: u32, entry: CatalogEntry) {
        self.entries.lock().put(wkid, entry);
    }

    pub fn contains(&self, wkid: u32) -> bool {
        self.entries.lock().contains(&wkid)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for WkidCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
