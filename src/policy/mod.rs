//! Store implementations, one module per eviction policy.
//!
//! | Module     | Bound     | Victim on overflow          |
//! |------------|-----------|-----------------------------|
//! | [`flat`]   | unbounded | none                        |
//! | [`fifo`]   | bounded   | oldest inserted key         |
//! | [`lru`]    | bounded   | least recently used key     |
//! | [`random`] | bounded   | uniformly chosen live key   |
//!
//! Each store comes in a primitive-key flavor (`FooCache<V>`) and an
//! identity-key flavor (`FooIdentityCache<V>`).

pub mod fifo;
pub mod flat;
pub mod lru;
pub mod random;

pub use fifo::{FifoCache, FifoIdentityCache};
pub use flat::{FlatCache, FlatIdentityCache};
pub use lru::{LruCache, LruIdentityCache};
pub use random::{RandomCache, RandomIdentityCache};
