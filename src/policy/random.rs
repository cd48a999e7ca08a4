//! Random-replacement bounded store.
//!
//! When a new key arrives at a full store, a uniformly chosen live key is
//! evicted and the new key takes its place. Reads and overwrites have no
//! effect on which key is chosen next.
//!
//! ## Architecture
//!
//! ```text
//!   map: FxHashMap<CacheKey, (usize, V)>     keys: Vec<CacheKey>
//!   ┌──────────┬────────────┐                ┌─────┬─────┬─────┬─────┐
//!   │   "a"    │ (0, s_a) ──┼──────────────► │  a  │  b  │  c  │  d  │
//!   │   "b"    │ (1, s_b)   │                └─────┴─────┴─────┴─────┘
//!   └──────────┴────────────┘                   0     1     2     3
//!
//!   set(e) when full:  i = rng(0..4) = 1  →  keys[1] = e, map: -b, +e@1
//!   remove(a):         swap keys[0] with keys[3], pop, fix d's index → [d, b, c]
//! ```
//!
//! ## Operations
//!
//! | Operation | Time | Notes                                  |
//! |-----------|------|----------------------------------------|
//! | `set`     | O(1) | replaces a random victim when full     |
//! | `get`     | O(1) |                                        |
//! | `remove`  | O(1) | swap-remove in the key array           |
//! | `clear`   | O(n) |                                        |
//!
//! Use [`RandomCache::with_seed`] for reproducible eviction in tests.
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::key::CacheKey;
//! use selectkit::policy::random::RandomCache;
//! use selectkit::traits::SelectorCache;
//!
//! let mut cache: RandomCache<u32> = RandomCache::try_new(4).unwrap();
//! for i in 0..10u32 {
//!     cache.set(CacheKey::from(i), i);
//! }
//! assert_eq!(cache.len(), 4);
//! assert!(cache.contains(&CacheKey::from(9)));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroUsize;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{ConfigError, InvariantError};
use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::{StoreMetrics, StoreMetricsRecorder};
use crate::options::CacheOptions;
use crate::traits::{IdentityKeys, KeyDomain, KeyValidator, PrimitiveKeys, SelectorCache};

/// Bounded store evicting a uniformly random key.
pub struct RandomCache<V, D: KeyDomain = PrimitiveKeys> {
    map: FxHashMap<CacheKey, (usize, V)>,
    keys: Vec<CacheKey>,
    capacity: NonZeroUsize,
    rng: SmallRng,
    #[cfg(feature = "metrics")]
    metrics: StoreMetricsRecorder,
    _domain: PhantomData<D>,
}

/// Random-replacement store accepting any key.
pub type RandomIdentityCache<V> = RandomCache<V, IdentityKeys>;

impl<V, D: KeyDomain> RandomCache<V, D> {
    /// Creates an empty store holding at most `cache_size` entries, seeded
    /// from the operating system.
    pub fn new(cache_size: NonZeroUsize) -> Self {
        Self::with_rng(cache_size, SmallRng::from_os_rng())
    }

    /// Creates a store whose eviction sequence is determined by `seed`.
    pub fn with_seed(cache_size: NonZeroUsize, seed: u64) -> Self {
        Self::with_rng(cache_size, SmallRng::seed_from_u64(seed))
    }

    /// Creates a store, rejecting a zero `cache_size`.
    pub fn try_new(cache_size: usize) -> Result<Self, ConfigError> {
        Self::with_options(CacheOptions::with_cache_size(cache_size))
    }

    /// Creates a store from an options record.
    pub fn with_options(options: CacheOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(options.validated_cache_size()?))
    }

    fn with_rng(cache_size: NonZeroUsize, rng: SmallRng) -> Self {
        let capacity = cache_size.get();
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            keys: Vec::with_capacity(capacity),
            capacity: cache_size,
            rng,
            #[cfg(feature = "metrics")]
            metrics: StoreMetricsRecorder::default(),
            _domain: PhantomData,
        }
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.keys.iter()
    }

    /// Checks that every slot index in the map points back at its key.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.keys.len() {
            return Err(InvariantError::new(format!(
                "key array length {} != map length {}",
                self.keys.len(),
                self.map.len()
            )));
        }
        if self.keys.len() > self.capacity.get() {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.keys.len(),
                self.capacity
            )));
        }
        for (index, key) in self.keys.iter().enumerate() {
            match self.map.get(key) {
                Some((slot, _)) if *slot == index => {},
                Some((slot, _)) => {
                    return Err(InvariantError::new(format!(
                        "key {} stored at {} but indexed as {}",
                        key, index, slot
                    )));
                },
                None => return Err(InvariantError::new(format!("key {} missing from map", key))),
            }
        }
        Ok(())
    }
}

impl<V> RandomCache<V, PrimitiveKeys> {
    /// Returns `true` iff `key` is a string or a number.
    pub fn is_valid_cache_key(&self, key: &CacheKey) -> bool {
        PrimitiveKeys::admits(key)
    }
}

impl<V, D: KeyDomain> SelectorCache<V> for RandomCache<V, D> {
    fn set(&mut self, key: CacheKey, value: V) {
        if !D::admits(&key) {
            debug!(cache_key = %key, kind = key.kind(), "random cache dropped inadmissible key");
            return;
        }
        if let Some((_, existing)) = self.map.get_mut(&key) {
            *existing = value;
            #[cfg(feature = "metrics")]
            self.metrics.record_update();
            return;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert();
        if self.keys.len() < self.capacity.get() {
            self.map.insert(key.clone(), (self.keys.len(), value));
            self.keys.push(key);
            return;
        }

        let index = self.rng.random_range(0..self.keys.len());
        let victim = std::mem::replace(&mut self.keys[index], key.clone());
        self.map.remove(&victim);
        self.map.insert(key, (index, value));
        trace!(cache_key = %victim, slot = index, "random cache replaced key");
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
    }

    fn get(&mut self, key: &CacheKey) -> Option<&V> {
        let found = self.map.get(key).map(|(_, value)| value);
        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        found
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        let (index, value) = self.map.remove(key)?;
        self.keys.swap_remove(index);
        if let Some(moved) = self.keys.get(index) {
            if let Some((slot, _)) = self.map.get_mut(moved) {
                *slot = index;
            }
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        Some(value)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.keys.clear();
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

impl<V, D: KeyDomain> fmt::Debug for RandomCache<V, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomCache")
            .field("domain", &D::NAME)
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}
