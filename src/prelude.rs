pub use crate::builder::{Cache, CacheBuilder, CachePolicy, KeyDomainKind, StoreConfig};
pub use crate::cached::{
    CachedSelector, CachedSelectorBuilder, CachedSelectorOptions, SelectorConfig, create_cached_selector,
};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::key::{CacheKey, ObjectKey};
pub use crate::key_selector::{
    KeySelectorCombiner, KeySelectorContext, KeySelectorCreator, combine_key_selectors,
};
#[cfg(feature = "metrics")]
pub use crate::metrics::StoreMetrics;
pub use crate::options::CacheOptions;
pub use crate::policy::fifo::{FifoCache, FifoIdentityCache};
pub use crate::policy::flat::{FlatCache, FlatIdentityCache};
pub use crate::policy::lru::{LruCache, LruIdentityCache};
pub use crate::policy::random::{RandomCache, RandomIdentityCache};
pub use crate::selector::{
    InputSelector, KeySelector, MemoizedSelectorCreator, PassthroughSelectorCreator, ResultFn, Selector,
    SelectorCreator, SelectorRef,
};
pub use crate::structured::create_structured_cached_selector;
pub use crate::traits::{IdentityKeys, KeyDomain, PrimitiveKeys, SelectorCache};
