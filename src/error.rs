//! Error types for the selectkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a store or cached selector is configured
//!   with invalid parameters (missing or zero `cache_size`, no key selector,
//!   the removed two-argument builder form).
//! - [`InvariantError`]: Returned by `check_invariants` on bounded stores when
//!   the entry map and the eviction-order structure disagree.
//!
//! Invalid cache keys produced at call time are *not* errors: the cached
//! selector logs a warning and returns `None`.
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::error::ConfigError;
//! use selectkit::policy::fifo::FifoCache;
//!
//! let cache: Result<FifoCache<u32>, ConfigError> = FifoCache::try_new(10);
//! assert!(cache.is_ok());
//!
//! let bad: Result<FifoCache<u32>, ConfigError> = FifoCache::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by fallible store constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new), by
/// [`CacheBuilder::build`](crate::builder::CacheBuilder::build) and by
/// [`CachedSelectorBuilder::build`](crate::cached::CachedSelectorBuilder::build).
///
/// # Example
///
/// ```
/// use selectkit::options::{CacheOptions, validate_cache_size};
///
/// let err = validate_cache_size(CacheOptions::default().cache_size).unwrap_err();
/// assert!(err.to_string().contains("Missing"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a store's entry map and eviction order disagree.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
