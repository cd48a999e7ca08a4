//! Unbounded store.
//!
//! [`FlatCache`] never evicts: entries stay until they are removed or the
//! store is cleared. It is the default store of a cached selector.
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::key::{CacheKey, ObjectKey};
//! use selectkit::policy::flat::{FlatCache, FlatIdentityCache};
//! use selectkit::traits::SelectorCache;
//!
//! // Primitive keys only
//! let mut cache: FlatCache<i32> = FlatCache::new();
//! cache.set(CacheKey::from("a"), 1);
//! assert_eq!(cache.get(&CacheKey::from("a")), Some(&1));
//! assert!(!cache.is_valid_cache_key(&CacheKey::Null));
//!
//! // Any key, objects by identity
//! let mut cache = FlatIdentityCache::new();
//! let obj = CacheKey::from(ObjectKey::new(()));
//! cache.set(obj.clone(), 2);
//! assert_eq!(cache.get(&obj), Some(&2));
//! ```

use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::{StoreMetrics, StoreMetricsRecorder};
use crate::traits::{IdentityKeys, KeyDomain, KeyValidator, PrimitiveKeys, SelectorCache};

/// Unbounded associative store.
pub struct FlatCache<V, D: KeyDomain = PrimitiveKeys> {
    map: FxHashMap<CacheKey, V>,
    #[cfg(feature = "metrics")]
    metrics: StoreMetricsRecorder,
    _domain: PhantomData<D>,
}

/// Unbounded store accepting any key.
pub type FlatIdentityCache<V> = FlatCache<V, IdentityKeys>;

impl<V, D: KeyDomain> FlatCache<V, D> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            #[cfg(feature = "metrics")]
            metrics: StoreMetricsRecorder::default(),
            _domain: PhantomData,
        }
    }

    /// Iterates over stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.map.keys()
    }
}

impl<V> FlatCache<V, PrimitiveKeys> {
    /// Returns `true` iff `key` is a string or a number.
    pub fn is_valid_cache_key(&self, key: &CacheKey) -> bool {
        PrimitiveKeys::admits(key)
    }
}

impl<V, D: KeyDomain> Default for FlatCache<V, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, D: KeyDomain> SelectorCache<V> for FlatCache<V, D> {
    fn set(&mut self, key: CacheKey, value: V) {
        if !D::admits(&key) {
            debug!(cache_key = %key, kind = key.kind(), "flat cache dropped inadmissible key");
            return;
        }
        let _previous = self.map.insert(key, value);
        #[cfg(feature = "metrics")]
        if _previous.is_some() {
            self.metrics.record_update();
        } else {
            self.metrics.record_insert();
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<&V> {
        let found = self.map.get(key);
        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        found
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        let removed = self.map.remove(key);
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove();
        }
        removed
    }

    fn clear(&mut self) {
        self.map.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    fn contains(&self, key: &CacheKey) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn key_validator(&self) -> Option<KeyValidator> {
        D::VALIDATOR
    }

    #[cfg(feature = "metrics")]
    fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<V, D: KeyDomain> fmt::Debug for FlatCache<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatCache")
            .field("domain", &D::NAME)
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}
