//! Configuration record for bounded stores.
//!
//! Bounded stores (FIFO, LRU, random replacement) need a positive
//! `cache_size`. [`CacheOptions`] carries it as an `Option` so that a
//! record deserialized from configuration can report a *missing* size
//! separately from an *invalid* one.
//!
//! ```
//! use selectkit::options::{CacheOptions, validate_cache_size};
//!
//! assert_eq!(validate_cache_size(Some(5)).unwrap().get(), 5);
//!
//! let missing = validate_cache_size(CacheOptions::default().cache_size).unwrap_err();
//! assert_eq!(missing.message(), r#"Missing the required property "cache_size"."#);
//!
//! let zero = validate_cache_size(Some(0)).unwrap_err();
//! assert!(zero.message().contains("positive integer"));
//! ```

use std::num::NonZeroUsize;

use crate::error::ConfigError;

/// Options accepted by bounded store constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheOptions {
    /// Maximum number of entries. Required by bounded stores.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cache_size: Option<usize>,
}

impl CacheOptions {
    /// Options with the given cache size.
    pub fn with_cache_size(cache_size: usize) -> Self {
        Self {
            cache_size: Some(cache_size),
        }
    }

    /// Validates and returns the cache size.
    pub fn validated_cache_size(&self) -> Result<NonZeroUsize, ConfigError> {
        validate_cache_size(self.cache_size)
    }
}

/// Checks that `cache_size` is present and positive.
pub fn validate_cache_size(cache_size: Option<usize>) -> Result<NonZeroUsize, ConfigError> {
    let size = cache_size
        .ok_or_else(|| ConfigError::new(r#"Missing the required property "cache_size"."#))?;
    NonZeroUsize::new(size).ok_or_else(|| {
        ConfigError::new(r#"The "cache_size" property must be a positive integer value."#)
    })
}
