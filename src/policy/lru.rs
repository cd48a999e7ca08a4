//! Least-recently-used bounded store.
//!
//! A key is "used" when it is set (insert or overwrite) or successfully read
//! with [`SelectorCache::get`]. When an insert pushes the store over capacity
//! the least recently used key is evicted. [`SelectorCache::contains`] does
//! not count as a use.
//!
//! ## Architecture
//!
//! ```text
//!   map: FxHashMap<CacheKey, Entry>        order: IntrusiveList<CacheKey>
//!   ┌──────────┬──────────────────┐
//!   │ CacheKey │ (SlotId, value)  │        front (LRU)           back (MRU)
//!   ├──────────┼──────────────────┤          │                      │
//!   │   "a"    │ (id_0, s_a) ─────┼─────►  [a] ◄──► [b] ◄──► [c] ◄──► [d]
//!   │   "b"    │ (id_1, s_b)      │
//!   └──────────┴──────────────────┘
//!
//!   get(b):   move_to_back(id_1)  →  [a, c, d, b]
//!   set(e):   push_back(e), over capacity → pop_front() evicts a
//! ```
//!
//! ## Operations
//!
//! | Operation | Time | Notes                               |
//! |-----------|------|-------------------------------------|
//! | `set`     | O(1) | promotes, may evict the front key   |
//! | `get`     | O(1) | promotes on hit                     |
//! | `remove`  | O(1) |                                     |
//! | `clear`   | O(n) |                                     |
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::key::CacheKey;
//! use selectkit::policy::lru::LruCache;
//! use selectkit::traits::SelectorCache;
//!
//! let mut cache: LruCache<&str> = LruCache::try_new(3).unwrap();
//! cache.set(CacheKey::from(0), "zero");
//! cache.set(CacheKey::from(1), "one");
//! cache.set(CacheKey::from(2), "two");
//! cache.get(&CacheKey::from(0)); // 0 is now most recent
//! cache.set(CacheKey::from(3), "three");
//!
//! assert!(cache.contains(&CacheKey::from(0)));
//! assert!(!cache.contains(&CacheKey::from(1)));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::{StoreMetrics, StoreMetricsRecorder};
use crate::options::CacheOptions;
use crate::traits::{IdentityKeys, KeyDomain, KeyValidator, PrimitiveKeys, SelectorCache};

struct Entry<V> {
    slot: SlotId,
    value: V,
}

/// Bounded store evicting the least recently used key.
pub struct LruCache<V, D: KeyDomain = PrimitiveKeys> {
    map: FxHashMap<CacheKey, Entry<V>>,
    order: IntrusiveList<CacheKey>,
    capacity: NonZeroUsize,
    #[cfg(feature = "metrics")]
    metrics: StoreMetricsRecorder,
    _domain: PhantomData<D>,
}

/// LRU store accepting any key.
pub type LruIdentityCache<V> = LruCache<V, IdentityKeys>;

impl<V, D: KeyDomain> LruCache<V, D> {
    /// Creates an empty store holding at most `cache_size` entries.
    pub fn new(cache_size: NonZeroUsize) -> Self {
        let capacity = cache_size.get();
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: IntrusiveList::with_capacity(capacity),
            capacity: cache_size,
            #[cfg(feature = "metrics")]
            metrics: StoreMetricsRecorder::default(),
            _domain: PhantomData,
        }
    }

    /// Creates a store, rejecting a zero `cache_size`.
    pub fn try_new(cache_size: usize) -> Result<Self, ConfigError> {
        Self::with_options(CacheOptions::with_cache_size(cache_size))
    }

    /// Creates a store from an options record.
    pub fn with_options(options: CacheOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(options.validated_cache_size()?))
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }

    /// Key that the next overflowing insert would evict, without promoting it.
    pub fn peek_lru(&self) -> Option<&CacheKey> {
        self.order.front()
    }

    /// Reads an entry without counting it as a use.
    pub fn peek(&self, key: &CacheKey) -> Option<&V> {
        self.map.get(key).map(|entry| &entry.value)
    }

    /// Checks that the map and the recency list describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.order.check_links().map_err(InvariantError::new)?;
        if self.map.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "order length {} != map length {}",
                self.order.len(),
                self.map.len()
            )));
        }
        if self.map.len() > self.capacity.get() {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.map.len(),
                self.capacity
            )));
        }
        for (slot, key) in self.order.iter_entries() {
            match self.map.get(key) {
                Some(entry) if entry.slot == slot => {},
                Some(_) => {
                    return Err(InvariantError::new(format!("key {} points at a stale slot", key)));
                },
                None => return Err(InvariantError::new(format!("key {} missing from map", key))),
            }
        }
        Ok(())
    }

    fn evict_overflow(&mut self) {
        while self.map.len() > self.capacity.get() {
            let Some(victim) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&victim);
            trace!(cache_key = %victim, "lru cache evicted least recently used key");
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
        }
    }
}

impl<V> LruCache<V, PrimitiveKeys> {
    /// Returns `true` iff `key` is a string or a number.
    pub fn is_valid_cache_key(&self, key: &CacheKey) -> bool {
        PrimitiveKeys::admits(key)
    }
}

impl<V, D: KeyDomain> SelectorCache<V> for LruCache<V, D> {
    fn set(&mut self, key: CacheKey, value: V) {
        if !D::admits(&key) {
            debug!(cache_key = %key, kind = key.kind(), "lru cache dropped inadmissible key");
            return;
        }
        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
            self.order.move_to_back(entry.slot);
            #[cfg(feature = "metrics")]
            self.metrics.record_update();
            return;
        }

        let slot = self.order.push_back(key.clone());
        self.map.insert(key, Entry { slot, value });
        #[cfg(feature = "metrics")]
        self.metrics.record_insert();
        self.evict_overflow();
    }

    fn get(&mut self, key: &CacheKey) -> Option<&V> {
        let Some(entry) = self.map.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_miss();
            return None;
        };
        self.order.move_to_back(entry.slot);
        #[cfg(feature = "metrics")]
        self.metrics.record_hit();
        Some(&entry.value)
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        let entry = self.map.remove(key)?;
        self.order.remove(entry.slot);
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        Some(entry.value)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
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
        Some(self.capacity.get())
    }

    fn key_validator(&self) -> Option<KeyValidator> {
        D::VALIDATOR
    }

    #[cfg(feature = "metrics")]
    fn metrics(&self) -> StoreMetrics {
        self.metrics.snapshot()
    }
}

impl<V, D: KeyDomain> fmt::Debug for LruCache<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("domain", &D::NAME)
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}
