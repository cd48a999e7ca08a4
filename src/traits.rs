//! # Selector Cache Contract
//!
//! Every store that can hold memoized selector instances implements
//! [`SelectorCache`]. The cached selector facade only talks to stores through
//! this trait, so any conforming implementation can be substituted.
//!
//! ## Architecture
//!
//! ```text
//!                   ┌───────────────────────────────────────────┐
//!                   │            SelectorCache<V>               │
//!                   │                                           │
//!                   │  set(&mut, CacheKey, V)                   │
//!                   │  get(&mut, &CacheKey) → Option<&V>        │
//!                   │  remove(&mut, &CacheKey) → Option<V>      │
//!                   │  clear(&mut)                              │
//!                   │  contains / len / capacity                │
//!                   │  key_validator() → Option<KeyValidator>   │
//!                   └─────────────────────┬─────────────────────┘
//!                                         │
//!        ┌──────────────────┬─────────────┴─────┬──────────────────┐
//!        ▼                  ▼                   ▼                  ▼
//!   FlatCache<V, D>   FifoCache<V, D>     LruCache<V, D>    RandomCache<V, D>
//!    (unbounded)      (insertion order)   (access order)    (uniform victim)
//!
//!   D: KeyDomain ── PrimitiveKeys  (strings/numbers only, validator present)
//!               └── IdentityKeys   (any key, no validator)
//! ```
//!
//! ## Key Domains
//!
//! | Domain          | Admits                  | `key_validator()`              |
//! |-----------------|-------------------------|--------------------------------|
//! | `PrimitiveKeys` | `Str`, `Int`, `Float`   | `Some(is_string_or_number)`    |
//! | `IdentityKeys`  | every `CacheKey`        | `None`                         |
//!
//! A primitive-domain store never lets an inadmissible key reach its map:
//! `set` drops it, and lookups treat it as absent.
//!
//! ## Thread Safety
//!
//! Stores are single-threaded. Wrap the owning cached selector in a mutex if
//! it must be shared.

use crate::key::{CacheKey, is_string_or_number};
#[cfg(feature = "metrics")]
use crate::metrics::StoreMetrics;

/// Predicate deciding whether a key may be used with a store.
pub type KeyValidator = fn(&CacheKey) -> bool;

/// Store of memoized selector instances keyed by [`CacheKey`].
///
/// # Example
///
/// ```
/// use selectkit::key::CacheKey;
/// use selectkit::policy::lru::LruCache;
/// use selectkit::traits::SelectorCache;
///
/// fn warm<C: SelectorCache<&'static str>>(cache: &mut C) {
///     cache.set(CacheKey::from(1), "one");
///     cache.set(CacheKey::from(2), "two");
/// }
///
/// let mut cache: LruCache<&'static str> = LruCache::try_new(10).unwrap();
/// warm(&mut cache);
/// assert_eq!(cache.get(&CacheKey::from(1)), Some(&"one"));
/// ```
pub trait SelectorCache<V> {
    /// Inserts or overwrites the entry for `key`.
    ///
    /// Bounded stores evict exactly one entry when the insert pushes them
    /// over capacity.
    fn set(&mut self, key: CacheKey, value: V);

    /// Returns the entry for `key`.
    ///
    /// LRU stores treat a successful lookup as a use and promote the key.
    fn get(&mut self, key: &CacheKey) -> Option<&V>;

    /// Removes the entry for `key`, returning it. Absent keys are a no-op.
    fn remove(&mut self, key: &CacheKey) -> Option<V>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Checks for `key` without touching eviction order.
    fn contains(&self, key: &CacheKey) -> bool;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries, `None` when unbounded.
    fn capacity(&self) -> Option<usize>;

    /// Validity predicate for keys, if the store restricts them.
    fn key_validator(&self) -> Option<KeyValidator> {
        None
    }

    /// Snapshot of the store counters.
    #[cfg(feature = "metrics")]
    fn metrics(&self) -> StoreMetrics;
}

impl<V, C> SelectorCache<V> for Box<C>
where
    C: SelectorCache<V> + ?Sized,
{
    fn set(&mut self, key: CacheKey, value: V) {
        (**self).set(key, value)
    }

    fn get(&mut self, key: &CacheKey) -> Option<&V> {
        (**self).get(key)
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        (**self).remove(key)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn contains(&self, key: &CacheKey) -> bool {
        (**self).contains(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn capacity(&self) -> Option<usize> {
        (**self).capacity()
    }

    fn key_validator(&self) -> Option<KeyValidator> {
        (**self).key_validator()
    }

    #[cfg(feature = "metrics")]
    fn metrics(&self) -> StoreMetrics {
        (**self).metrics()
    }
}

/// Set of keys a store variant accepts.
pub trait KeyDomain {
    /// Validity predicate exposed by stores of this domain.
    const VALIDATOR: Option<KeyValidator>;

    /// Human readable name, used in `Debug` output.
    const NAME: &'static str;

    /// Returns `true` if `key` may enter the store.
    #[inline]
    fn admits(key: &CacheKey) -> bool {
        match Self::VALIDATOR {
            Some(valid) => valid(key),
            None => true,
        }
    }
}

/// Strings and numbers only, compared by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveKeys;

impl KeyDomain for PrimitiveKeys {
    const VALIDATOR: Option<KeyValidator> = Some(is_string_or_number);
    const NAME: &'static str = "primitive";
}

/// Any key; objects compared by identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityKeys;

impl KeyDomain for IdentityKeys {
    const VALIDATOR: Option<KeyValidator> = None;
    const NAME: &'static str = "identity";
}
