//! Unified store builder for all eviction policies and key domains.
//!
//! Picks a concrete store at runtime and hides it behind [`Cache`], which
//! implements [`SelectorCache`] by dispatching to the selected variant.
//!
//! ## Example
//!
//! ```rust
//! use selectkit::builder::{CacheBuilder, CachePolicy, KeyDomainKind};
//! use selectkit::key::CacheKey;
//! use selectkit::traits::SelectorCache;
//!
//! let mut cache = CacheBuilder::new()
//!     .cache_size(100)
//!     .build::<String>(CachePolicy::Lru)
//!     .unwrap();
//! cache.set(CacheKey::from(1), "hello".to_string());
//! assert_eq!(cache.get(&CacheKey::from(1)), Some(&"hello".to_string()));
//!
//! // Flat stores ignore `cache_size`
//! let flat = CacheBuilder::new()
//!     .key_domain(KeyDomainKind::Identity)
//!     .build::<u8>(CachePolicy::Flat)
//!     .unwrap();
//! assert_eq!(flat.capacity(), None);
//! ```

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::ConfigError;
use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::StoreMetrics;
use crate::options::{CacheOptions, validate_cache_size};
use crate::policy::fifo::{FifoCache, FifoIdentityCache};
use crate::policy::flat::{FlatCache, FlatIdentityCache};
use crate::policy::lru::{LruCache, LruIdentityCache};
use crate::policy::random::{RandomCache, RandomIdentityCache};
use crate::traits::{KeyValidator, SelectorCache};

/// Available eviction policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CachePolicy {
    /// Unbounded, never evicts.
    #[default]
    Flat,
    /// First In, First Out eviction.
    Fifo,
    /// Least Recently Used eviction.
    Lru,
    /// Uniformly random eviction.
    Random,
}

impl CachePolicy {
    /// Returns `true` for policies that require a `cache_size`.
    pub fn is_bounded(self) -> bool {
        !matches!(self, CachePolicy::Flat)
    }
}

/// Which keys a built store accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum KeyDomainKind {
    /// Strings and numbers only.
    #[default]
    Primitive,
    /// Any key, objects by identity.
    Identity,
}

/// Store selected at runtime.
pub struct Cache<V> {
    inner: CacheInner<V>,
}

enum CacheInner<V> {
    Flat(FlatCache<V>),
    FlatIdentity(FlatIdentityCache<V>),
    Fifo(FifoCache<V>),
    FifoIdentity(FifoIdentityCache<V>),
    Lru(LruCache<V>),
    LruIdentity(LruIdentityCache<V>),
    Random(RandomCache<V>),
    RandomIdentity(RandomIdentityCache<V>),
}

macro_rules! dispatch {
    ($inner:expr, $store:ident => $body:expr) => {
        match $inner {
            CacheInner::Flat($store) => $body,
            CacheInner::FlatIdentity($store) => $body,
            CacheInner::Fifo($store) => $body,
            CacheInner::FifoIdentity($store) => $body,
            CacheInner::Lru($store) => $body,
            CacheInner::LruIdentity($store) => $body,
            CacheInner::Random($store) => $body,
            CacheInner::RandomIdentity($store) => $body,
        }
    };
}

impl<V> Cache<V> {
    /// Policy of the underlying store.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Flat(_) | CacheInner::FlatIdentity(_) => CachePolicy::Flat,
            CacheInner::Fifo(_) | CacheInner::FifoIdentity(_) => CachePolicy::Fifo,
            CacheInner::Lru(_) | CacheInner::LruIdentity(_) => CachePolicy::Lru,
            CacheInner::Random(_) | CacheInner::RandomIdentity(_) => CachePolicy::Random,
        }
    }

    /// Key domain of the underlying store.
    pub fn key_domain(&self) -> KeyDomainKind {
        match &self.inner {
            CacheInner::Flat(_) | CacheInner::Fifo(_) | CacheInner::Lru(_) | CacheInner::Random(_) => {
                KeyDomainKind::Primitive
            },
            _ => KeyDomainKind::Identity,
        }
    }
}

impl<V> SelectorCache<V> for Cache<V> {
    fn set(&mut self, key: CacheKey, value: V) {
        dispatch!(&mut self.inner, store => store.set(key, value))
    }

    fn get(&mut self, key: &CacheKey) -> Option<&V> {
        dispatch!(&mut self.inner, store => store.get(key))
    }

    fn remove(&mut self, key: &CacheKey) -> Option<V> {
        dispatch!(&mut self.inner, store => store.remove(key))
    }

    fn clear(&mut self) {
        dispatch!(&mut self.inner, store => store.clear())
    }

    fn contains(&self, key: &CacheKey) -> bool {
        dispatch!(&self.inner, store => store.contains(key))
    }

    fn len(&self) -> usize {
        dispatch!(&self.inner, store => store.len())
    }

    fn capacity(&self) -> Option<usize> {
        dispatch!(&self.inner, store => store.capacity())
    }

    fn key_validator(&self) -> Option<KeyValidator> {
        dispatch!(&self.inner, store => store.key_validator())
    }

    #[cfg(feature = "metrics")]
    fn metrics(&self) -> StoreMetrics {
        dispatch!(&self.inner, store => store.metrics())
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(&self.inner, store => fmt::Debug::fmt(store, f))
    }
}

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone, Default)]
pub struct CacheBuilder {
    cache_size: Option<usize>,
    key_domain: KeyDomainKind,
    seed: Option<u64>,
}

impl CacheBuilder {
    /// Builder for a primitive-key store with no size set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from an options record.
    pub fn from_options(options: CacheOptions) -> Self {
        Self {
            cache_size: options.cache_size,
            ..Self::default()
        }
    }

    /// Maximum number of entries for bounded policies.
    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = Some(cache_size);
        self
    }

    /// Selects the key domain.
    pub fn key_domain(mut self, key_domain: KeyDomainKind) -> Self {
        self.key_domain = key_domain;
        self
    }

    /// Fixes the random-replacement seed. Ignored by other policies.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds a store with the given policy.
    ///
    /// # Errors
    ///
    /// Bounded policies return [`ConfigError`] when `cache_size` is missing
    /// or zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use selectkit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let err = CacheBuilder::new().build::<u8>(CachePolicy::Fifo).unwrap_err();
    /// assert!(err.message().contains("cache_size"));
    ///
    /// let random = CacheBuilder::new().cache_size(8).seed(1).build::<u8>(CachePolicy::Random);
    /// assert!(random.is_ok());
    /// ```
    pub fn build<V>(self, policy: CachePolicy) -> Result<Cache<V>, ConfigError> {
        use KeyDomainKind::{Identity, Primitive};

        let size = || -> Result<NonZeroUsize, ConfigError> { validate_cache_size(self.cache_size) };
        let inner = match (policy, self.key_domain) {
            (CachePolicy::Flat, Primitive) => CacheInner::Flat(FlatCache::new()),
            (CachePolicy::Flat, Identity) => CacheInner::FlatIdentity(FlatIdentityCache::new()),
            (CachePolicy::Fifo, Primitive) => CacheInner::Fifo(FifoCache::new(size()?)),
            (CachePolicy::Fifo, Identity) => CacheInner::FifoIdentity(FifoIdentityCache::new(size()?)),
            (CachePolicy::Lru, Primitive) => CacheInner::Lru(LruCache::new(size()?)),
            (CachePolicy::Lru, Identity) => CacheInner::LruIdentity(LruIdentityCache::new(size()?)),
            (CachePolicy::Random, Primitive) => CacheInner::Random(match self.seed {
                Some(seed) => RandomCache::with_seed(size()?, seed),
                None => RandomCache::new(size()?),
            }),
            (CachePolicy::Random, Identity) => CacheInner::RandomIdentity(match self.seed {
                Some(seed) => RandomIdentityCache::with_seed(size()?, seed),
                None => RandomIdentityCache::new(size()?),
            }),
        };
        Ok(Cache { inner })
    }
}

/// Declarative store description, deserializable with the `serde` feature.
///
/// ```
/// use selectkit::builder::{CachePolicy, KeyDomainKind, StoreConfig};
///
/// let config = StoreConfig {
///     policy: CachePolicy::Fifo,
///     key_domain: KeyDomainKind::Primitive,
///     cache_size: Some(3),
/// };
/// let cache = config.build::<u8>().unwrap();
/// assert_eq!(cache.policy(), CachePolicy::Fifo);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreConfig {
    pub policy: CachePolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub key_domain: KeyDomainKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cache_size: Option<usize>,
}

impl StoreConfig {
    /// Builds the described store.
    pub fn build<V>(&self) -> Result<Cache<V>, ConfigError> {
        CacheBuilder::from_options(CacheOptions {
            cache_size: self.cache_size,
        })
        .key_domain(self.key_domain)
        .build(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ObjectKey;

    const ALL_POLICIES: [CachePolicy; 4] = [
        CachePolicy::Flat,
        CachePolicy::Fifo,
        CachePolicy::Lru,
        CachePolicy::Random,
    ];

    #[test]
    fn all_policies_basic_ops() {
        for policy in ALL_POLICIES {
            let mut cache = CacheBuilder::new()
                .cache_size(10)
                .build::<String>(policy)
                .unwrap();

            cache.set(CacheKey::from(1), "one".to_string());
            cache.set(CacheKey::from(2), "two".to_string());

            assert_eq!(cache.get(&CacheKey::from(1)), Some(&"one".to_string()));
            assert_eq!(cache.get(&CacheKey::from(3)), None);
            assert!(cache.contains(&CacheKey::from(2)));
            assert_eq!(cache.len(), 2);

            cache.set(CacheKey::from(1), "ONE".to_string());
            assert_eq!(cache.get(&CacheKey::from(1)), Some(&"ONE".to_string()));

            assert_eq!(cache.remove(&CacheKey::from(1)), Some("ONE".to_string()));
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.policy(), policy);
        }
    }

    #[test]
    fn capacity_enforcement() {
        let mut cache = CacheBuilder::new().cache_size(2).build::<u8>(CachePolicy::Lru).unwrap();
        cache.set(CacheKey::from(1), 1);
        cache.set(CacheKey::from(2), 2);
        cache.set(CacheKey::from(3), 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&CacheKey::from(1)));
        assert_eq!(cache.capacity(), Some(2));
    }

    #[test]
    fn bounded_policies_require_cache_size() {
        for policy in ALL_POLICIES.into_iter().filter(|p| p.is_bounded()) {
            let missing = CacheBuilder::new().build::<u8>(policy).unwrap_err();
            assert_eq!(missing.message(), r#"Missing the required property "cache_size"."#);

            let zero = CacheBuilder::new().cache_size(0).build::<u8>(policy).unwrap_err();
            assert_eq!(
                zero.message(),
                r#"The "cache_size" property must be a positive integer value."#
            );
        }
    }

    #[test]
    fn key_domain_selects_validator() {
        for policy in ALL_POLICIES {
            let primitive = CacheBuilder::new().cache_size(4).build::<u8>(policy).unwrap();
            assert!(primitive.key_validator().is_some());
            assert_eq!(primitive.key_domain(), KeyDomainKind::Primitive);

            let mut identity = CacheBuilder::new()
                .cache_size(4)
                .key_domain(KeyDomainKind::Identity)
                .build::<u8>(policy)
                .unwrap();
            assert!(identity.key_validator().is_none());
            assert_eq!(identity.key_domain(), KeyDomainKind::Identity);

            let obj = CacheKey::from(ObjectKey::new(()));
            identity.set(obj.clone(), 9);
            assert_eq!(identity.get(&obj), Some(&9));
        }
    }

    #[test]
    fn store_config_builds() {
        let config = StoreConfig {
            policy: CachePolicy::Random,
            key_domain: KeyDomainKind::Identity,
            cache_size: Some(2),
        };
        let cache = config.build::<u8>().unwrap();
        assert_eq!(cache.policy(), CachePolicy::Random);
        assert_eq!(cache.key_domain(), KeyDomainKind::Identity);

        let missing = StoreConfig {
            policy: CachePolicy::Lru,
            ..StoreConfig::default()
        };
        assert!(missing.build::<u8>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn store_config_from_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"policy": "lru", "key_domain": "identity", "cache_size": 4}"#)
                .unwrap();
        assert_eq!(config.policy, CachePolicy::Lru);
        assert_eq!(config.key_domain, KeyDomainKind::Identity);
        assert_eq!(config.build::<u8>().unwrap().capacity(), Some(4));

        let flat: StoreConfig = serde_json::from_str(r#"{"policy": "flat"}"#).unwrap();
        assert_eq!(flat.build::<u8>().unwrap().capacity(), None);
    }
}
