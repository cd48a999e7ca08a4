//! selectkit: keyed caches of memoized selectors with pluggable eviction
//! policies.
//!
//! A cached selector computes a cache key for every call, keeps one memoized
//! selector instance per key in a store, and delegates the call to that
//! instance. Stores are interchangeable through [`traits::SelectorCache`]:
//!
//! | Store                         | Bound     | Keys                 |
//! |-------------------------------|-----------|----------------------|
//! | [`policy::FlatCache`]         | unbounded | strings and numbers  |
//! | [`policy::FifoCache`]         | bounded   | strings and numbers  |
//! | [`policy::LruCache`]          | bounded   | strings and numbers  |
//! | [`policy::RandomCache`]       | bounded   | strings and numbers  |
//! | `*IdentityCache` variants     | same      | any key, by identity |
//!
//! ```
//! use selectkit::prelude::*;
//!
//! type Args = (Vec<u32>, &'static str);
//!
//! let mut count_for = create_cached_selector(
//!     vec![InputSelector::new(|a: &Args| a.0.len())],
//!     |v: &[usize]| v[0] * 10,
//! )
//! .build(
//!     CachedSelectorOptions::new()
//!         .key_selector(|a: &Args| CacheKey::from(a.1))
//!         .cache_object(CacheBuilder::new().cache_size(16).build(CachePolicy::Lru).unwrap()),
//! )
//! .unwrap();
//!
//! assert_eq!(count_for.call(&(vec![1, 2], "a")), Some(20));
//! assert_eq!(count_for.recomputations(), 1);
//! ```

pub mod builder;
pub mod cached;
pub mod ds;
pub mod error;
pub mod key;
pub mod key_selector;
pub mod options;
pub mod policy;
pub mod selector;
pub mod structured;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
