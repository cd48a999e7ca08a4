//! First-in, first-out bounded store.
//!
//! When an insert pushes the store over capacity, the key that was inserted
//! earliest among the keys still present is evicted. Lookups never change
//! the order, and overwriting an existing key keeps its original position.
//!
//! ## Architecture
//!
//! ```text
//!   map: FxHashMap<CacheKey, Entry>        order: IntrusiveList<CacheKey>
//!   ┌──────────┬──────────────────┐
//!   │ CacheKey │ (SlotId, value)  │        front (oldest)        back (newest)
//!   ├──────────┼──────────────────┤          │                      │
//!   │   "a"    │ (id_0, s_a) ─────┼─────►  [a] ◄──► [b] ◄──► [c] ◄──► [d]
//!   │   "b"    │ (id_1, s_b)      │
//!   └──────────┴──────────────────┘
//!
//!   set(e) on a full store of 4:  push_back(e), len 5 > 4, pop_front() → evict a
//!   remove(b):                    unlink id_1, order stays [a, c, d]
//! ```
//!
//! ## Operations
//!
//! | Operation | Time | Notes                                  |
//! |-----------|------|----------------------------------------|
//! | `set`     | O(1) | may evict the front key                |
//! | `get`     | O(1) | no ordering side effect                |
//! | `remove`  | O(1) | unlinks the order node by handle       |
//! | `clear`   | O(n) |                                        |
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::key::CacheKey;
//! use selectkit::policy::fifo::FifoCache;
//! use selectkit::traits::SelectorCache;
//!
//! let mut cache: FifoCache<u32> = FifoCache::try_new(2).unwrap();
//! cache.set(CacheKey::from(1), 1);
//! cache.set(CacheKey::from(2), 2);
//! cache.get(&CacheKey::from(1)); // does not protect key 1
//! cache.set(CacheKey::from(3), 3);
//!
//! assert!(!cache.contains(&CacheKey::from(1)));
//! assert!(cache.contains(&CacheKey::from(2)));
//! assert!(cache.contains(&CacheKey::from(3)));
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

/// Bounded store evicting in insertion order.
pub struct FifoCache<V, D: KeyDomain = PrimitiveKeys> {
    map: FxHashMap<CacheKey, Entry<V>>,
    order: IntrusiveList<CacheKey>,
    capacity: NonZeroUsize,
    #[cfg(feature = "metrics")]
    metrics: StoreMetricsRecorder,
    _domain: PhantomData<D>,
}

/// FIFO store accepting any key.
pub type FifoIdentityCache<V> = FifoCache<V, IdentityKeys>;

impl<V, D: KeyDomain> FifoCache<V, D> {
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

    /// Keys from oldest to newest.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }

    /// Key that the next overflowing insert would evict.
    pub fn peek_oldest(&self) -> Option<&CacheKey> {
        self.order.front()
    }

    /// Checks that the map and the order list describe the same keys.
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
            trace!(cache_key = %victim, "fifo cache evicted oldest key");
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
        }
    }
}

impl<V> FifoCache<V, PrimitiveKeys> {
    /// Returns `true` iff `key` is a string or a number.
    pub fn is_valid_cache_key(&self, key: &CacheKey) -> bool {
        PrimitiveKeys::admits(key)
    }
}

impl<V, D: KeyDomain> SelectorCache<V> for FifoCache<V, D> {
    fn set(&mut self, key: CacheKey, value: V) {
        if !D::admits(&key) {
            debug!(cache_key = %key, kind = key.kind(), "fifo cache dropped inadmissible key");
            return;
        }
        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
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
        let found = self.map.get(key).map(|entry| &entry.value);
        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        found
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

impl<V, D: KeyDomain> fmt::Debug for FifoCache<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCache")
            .field("domain", &D::NAME)
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ObjectKey;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn key(k: impl Into<CacheKey>) -> CacheKey {
        k.into()
    }

    fn fill(cache: &mut FifoCache<i64>, keys: impl IntoIterator<Item = i64>) {
        for k in keys {
            cache.set(key(k), k);
        }
    }

    fn cache(size: usize) -> FifoCache<i64> {
        FifoCache::try_new(size).unwrap()
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn zero_cache_size_is_rejected() {
            let err = FifoCache::<i32>::with_options(CacheOptions::with_cache_size(0)).unwrap_err();
            assert!(err.message().contains("positive integer"));
        }

        #[test]
        fn missing_cache_size_is_rejected() {
            let err = FifoCache::<i32>::with_options(CacheOptions::default()).unwrap_err();
            assert!(err.message().contains("Missing"));
        }

        #[test]
        fn capacity_is_reported() {
            assert_eq!(cache(7).capacity(), Some(7));
        }
    }

    // ==============================================
    // Eviction Order
    // ==============================================

    mod eviction_order {
        use super::*;

        #[test]
        fn keeps_only_most_recent_entries() {
            let mut cache = cache(5);
            fill(&mut cache, [1, 2, 3, 4]);
            fill(&mut cache, [5, 6, 7]);

            assert_eq!(cache.get(&key(1)), None);
            assert_eq!(cache.get(&key(2)), None);
            for k in 3..=7 {
                assert_eq!(cache.get(&key(k)), Some(&k));
            }
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn reads_do_not_protect_keys() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2, 3]);
            cache.get(&key(1));
            fill(&mut cache, [4]);
            assert!(!cache.contains(&key(1)));
        }

        #[test]
        fn overwrite_keeps_position() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2, 3]);
            cache.set(key(1), 100);
            assert_eq!(cache.len(), 3);
            fill(&mut cache, [4]);

            assert!(!cache.contains(&key(1)));
            assert!(cache.contains(&key(2)));
            assert_eq!(cache.keys().cloned().collect::<Vec<_>>(), vec![key(2), key(3), key(4)]);
        }

        #[test]
        fn peek_oldest_names_next_victim() {
            let mut cache = cache(2);
            fill(&mut cache, [10, 20]);
            assert_eq!(cache.peek_oldest(), Some(&key(10)));
        }
    }

    // ==============================================
    // Removal
    // ==============================================

    mod removal {
        use super::*;

        #[test]
        fn remove_then_get_is_absent() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2]);
            assert_eq!(cache.remove(&key(1)), Some(1));
            assert_eq!(cache.get(&key(1)), None);
        }

        #[test]
        fn remove_absent_key_keeps_order_consistent() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2, 3]);
            assert_eq!(cache.remove(&key("never-inserted")), None);
            assert!(cache.check_invariants().is_ok());

            fill(&mut cache, [4]);
            assert!(!cache.contains(&key(1)));
            assert!(cache.contains(&key(2)));
        }

        #[test]
        fn remove_then_reinsert_does_not_evict_prematurely() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2, 3]);
            cache.remove(&key(2));
            fill(&mut cache, [2]);

            for k in 1..=3 {
                assert!(cache.contains(&key(k)), "key {} evicted early", k);
            }
        }

        #[test]
        fn remove_preserves_relative_order() {
            let mut cache = cache(4);
            fill(&mut cache, [1, 2, 3, 4]);
            cache.remove(&key(2));
            fill(&mut cache, [5, 6]);

            assert_eq!(cache.keys().cloned().collect::<Vec<_>>(), vec![key(3), key(4), key(5), key(6)]);
        }

        #[test]
        fn clear_empties_store() {
            let mut cache = cache(3);
            fill(&mut cache, [1, 2, 3]);
            cache.clear();
            assert!(cache.is_empty());
            for k in 1..=3 {
                assert_eq!(cache.get(&key(k)), None);
            }
            assert!(cache.check_invariants().is_ok());
        }
    }

    // ==============================================
    // Key Domains
    // ==============================================

    mod key_domains {
        use super::*;

        #[test]
        fn primitive_validator_rejects_objects() {
            let cache = cache(2);
            assert!(cache.is_valid_cache_key(&key(1.2)));
            assert!(!cache.is_valid_cache_key(&CacheKey::Null));
            assert!(cache.key_validator().is_some());
        }

        #[test]
        fn primitive_store_ignores_inadmissible_set() {
            let mut cache = cache(2);
            cache.set(key(ObjectKey::new(())), 1);
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn identity_store_evicts_objects_in_order() {
            let mut cache: FifoIdentityCache<u8> = FifoIdentityCache::try_new(2).unwrap();
            let a = key(ObjectKey::new(()));
            let b = key(ObjectKey::new(()));
            let c = key(ObjectKey::new(()));
            cache.set(a.clone(), 1);
            cache.set(b.clone(), 2);
            cache.set(c.clone(), 3);

            assert!(cache.key_validator().is_none());
            assert_eq!(cache.get(&a), None);
            assert_eq!(cache.get(&b), Some(&2));
            assert_eq!(cache.get(&c), Some(&3));
        }
    }

    proptest! {
        /// Property: the store matches a VecDeque model of insertion order
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_insertion_order_model(
            size in 1usize..6,
            ops in prop::collection::vec((0u8..3, 0i64..10), 0..200)
        ) {
            let mut cache = cache(size);
            let mut model: VecDeque<i64> = VecDeque::new();

            for (op, k) in ops {
                match op {
                    0 => {
                        cache.set(key(k), k);
                        if !model.contains(&k) {
                            model.push_back(k);
                            if model.len() > size {
                                model.pop_front();
                            }
                        }
                    },
                    1 => {
                        let expected = model.contains(&k).then_some(k);
                        prop_assert_eq!(cache.get(&key(k)).copied(), expected);
                    },
                    _ => {
                        cache.remove(&key(k));
                        model.retain(|m| *m != k);
                    },
                }
                prop_assert!(cache.check_invariants().is_ok());
                prop_assert!(cache.len() <= size);
                let keys: Vec<CacheKey> = cache.keys().cloned().collect();
                let expected: Vec<CacheKey> = model.iter().map(|k| key(*k)).collect();
                prop_assert_eq!(keys, expected);
            }
        }
    }
}
