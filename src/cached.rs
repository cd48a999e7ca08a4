//! The cached selector: one memoized selector instance per cache key.
//!
//! [`create_cached_selector`] takes the input selectors and the combiner and
//! returns a [`CachedSelectorBuilder`]. The builder is finished with a key
//! selector, or with a [`CachedSelectorOptions`] record that can also swap
//! the store, the selector creator, or derive the key selector.
//!
//! ## Call Flow
//!
//! ```text
//!   call(args)
//!     │
//!     ├─► key = key_selector(args)
//!     │
//!     ├─► store.key_validator()? rejects key ──► warn!, return None
//!     │
//!     ├─► store.get(key)
//!     │     ├─ hit  ──► reuse instance
//!     │     └─ miss ──► selector_creator.create(inputs, counting combiner)
//!     │                 store.set(key, instance)
//!     │
//!     └─► Some(instance.select(args))
//! ```
//!
//! The recomputation counter belongs to the cached selector, not to an
//! instance: it counts combiner runs across every key.
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::cached::create_cached_selector;
//! use selectkit::key::CacheKey;
//! use selectkit::selector::InputSelector;
//!
//! struct State {
//!     items: Vec<u32>,
//! }
//! type Args = (State, &'static str);
//!
//! let mut total_for = create_cached_selector(
//!     vec![
//!         InputSelector::new(|a: &Args| a.0.items.iter().sum::<u32>()),
//!         InputSelector::new(|a: &Args| a.1.len() as u32),
//!     ],
//!     |v: &[u32]| v[0] * v[1],
//! )
//! .with_key_selector(|a: &Args| CacheKey::from(a.1));
//!
//! let state = State { items: vec![1, 2, 3] };
//! let args = (state, "ab");
//! assert_eq!(total_for.call(&args), Some(12));
//! assert_eq!(total_for.call(&args), Some(12));
//! assert_eq!(total_for.recomputations(), 1);
//! assert!(total_for.get_matching_selector(&args).is_some());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::key::CacheKey;
use crate::key_selector::{KeySelectorContext, KeySelectorCreator};
use crate::policy::flat::FlatCache;
use crate::selector::{
    InputSelector, KeySelector, MemoizedSelectorCreator, RecomputationCounter, ResultFn,
    SelectorCreator, SelectorRef,
};
use crate::traits::{PrimitiveKeys, SelectorCache};

/// Store holding the selector instances of a cached selector.
pub type SelectorStore<A, R> = Box<dyn SelectorCache<SelectorRef<A, R>>>;

const LEGACY_SHAPE_MESSAGE: &str = "Passing \"options\" as second argument is not supported anymore. \
     Use CachedSelectorOptions with both `key_selector` and `selector_creator` instead.";

const MISSING_KEY_SELECTOR_MESSAGE: &str =
    "Missing the required property \"key_selector\" (or \"key_selector_creator\").";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options record accepted by [`CachedSelectorBuilder::build`].
///
/// At least one of `key_selector` and `key_selector_creator` must be set.
pub struct CachedSelectorOptions<A: ?Sized, T, R> {
    key_selector: Option<KeySelector<A>>,
    key_selector_creator: Option<Box<dyn KeySelectorCreator<A, T, R>>>,
    cache_object: Option<SelectorStore<A, R>>,
    selector_creator: Option<Box<dyn SelectorCreator<A, T, R>>>,
}

impl<A: ?Sized + 'static, T: 'static, R: 'static> CachedSelectorOptions<A, T, R> {
    pub fn new() -> Self {
        Self {
            key_selector: None,
            key_selector_creator: None,
            cache_object: None,
            selector_creator: None,
        }
    }

    pub fn key_selector(mut self, key_selector: impl Fn(&A) -> CacheKey + 'static) -> Self {
        self.key_selector = Some(Rc::new(key_selector));
        self
    }

    /// Derives the key selector once, at build time.
    ///
    /// The creator also receives `key_selector` when both are set.
    pub fn key_selector_creator(mut self, creator: impl KeySelectorCreator<A, T, R> + 'static) -> Self {
        self.key_selector_creator = Some(Box::new(creator));
        self
    }

    /// Store for selector instances. Defaults to an unbounded primitive-key
    /// [`FlatCache`].
    pub fn cache_object(mut self, cache: impl SelectorCache<SelectorRef<A, R>> + 'static) -> Self {
        self.cache_object = Some(Box::new(cache));
        self
    }

    /// Factory for selector instances. Defaults to [`MemoizedSelectorCreator`].
    pub fn selector_creator(mut self, creator: impl SelectorCreator<A, T, R> + 'static) -> Self {
        self.selector_creator = Some(Box::new(creator));
        self
    }
}

impl<A: ?Sized + 'static, T: 'static, R: 'static> Default for CachedSelectorOptions<A, T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, T, R> fmt::Debug for CachedSelectorOptions<A, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSelectorOptions")
            .field("key_selector", &self.key_selector.is_some())
            .field("key_selector_creator", &self.key_selector_creator.is_some())
            .field("cache_object", &self.cache_object.is_some())
            .field("selector_creator", &self.selector_creator.is_some())
            .finish()
    }
}

/// Ways to finish a [`CachedSelectorBuilder`].
pub enum SelectorConfig<A: ?Sized, T, R> {
    /// Bare key selector; default store and selector creator.
    KeySelector(KeySelector<A>),
    /// Full options record.
    Options(CachedSelectorOptions<A, T, R>),
    /// Key selector plus selector creator as separate arguments.
    ///
    /// This form is no longer accepted; building with it always fails.
    #[deprecated(note = "use `SelectorConfig::Options` with `key_selector` and `selector_creator`")]
    LegacyKeySelectorAndCreator {
        key_selector: KeySelector<A>,
        selector_creator: Box<dyn SelectorCreator<A, T, R>>,
    },
}

impl<A: ?Sized, T, R> From<CachedSelectorOptions<A, T, R>> for SelectorConfig<A, T, R> {
    fn from(options: CachedSelectorOptions<A, T, R>) -> Self {
        SelectorConfig::Options(options)
    }
}

impl<A: ?Sized, T, R> From<KeySelector<A>> for SelectorConfig<A, T, R> {
    fn from(key_selector: KeySelector<A>) -> Self {
        SelectorConfig::KeySelector(key_selector)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Creates a builder for a cached selector.
///
/// `input_selectors` run on every call; `result_fn` receives their outputs in
/// the same order.
pub fn create_cached_selector<A, T, R>(
    input_selectors: impl IntoIterator<Item = InputSelector<A, T>>,
    result_fn: impl Fn(&[T]) -> R + 'static,
) -> CachedSelectorBuilder<A, T, R>
where
    A: ?Sized + 'static,
    T: 'static,
    R: 'static,
{
    CachedSelectorBuilder {
        input_selectors: input_selectors.into_iter().collect(),
        result_fn: Rc::new(result_fn),
    }
}

/// Input selectors and combiner awaiting a key selector.
pub struct CachedSelectorBuilder<A: ?Sized, T, R> {
    input_selectors: Rc<[InputSelector<A, T>]>,
    result_fn: ResultFn<T, R>,
}

impl<A: ?Sized, T, R> CachedSelectorBuilder<A, T, R> {
    pub(crate) fn from_parts(input_selectors: Rc<[InputSelector<A, T>]>, result_fn: ResultFn<T, R>) -> Self {
        Self {
            input_selectors,
            result_fn,
        }
    }
}

impl<A, T, R> CachedSelectorBuilder<A, T, R>
where
    A: ?Sized + 'static,
    T: PartialEq + 'static,
    R: Clone + 'static,
{
    /// Finishes the builder with a key selector, the default store and the
    /// default selector creator.
    pub fn with_key_selector(self, key_selector: impl Fn(&A) -> CacheKey + 'static) -> CachedSelector<A, T, R> {
        self.assemble(
            Rc::new(key_selector),
            Box::new(FlatCache::<SelectorRef<A, R>, PrimitiveKeys>::new()),
            Box::new(MemoizedSelectorCreator),
        )
    }

    /// Finishes the builder from a key selector or an options record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the options carry neither a key selector
    /// nor a key selector creator, or when the legacy two-argument form is
    /// used.
    ///
    /// # Example
    ///
    /// ```
    /// use selectkit::builder::{CacheBuilder, CachePolicy};
    /// use selectkit::cached::{CachedSelectorOptions, create_cached_selector};
    /// use selectkit::key::CacheKey;
    /// use selectkit::selector::InputSelector;
    ///
    /// let mut double = create_cached_selector(
    ///     vec![InputSelector::new(|n: &i64| *n)],
    ///     |v: &[i64]| v[0] * 2,
    /// )
    /// .build(
    ///     CachedSelectorOptions::new()
    ///         .key_selector(|n: &i64| CacheKey::from(*n))
    ///         .cache_object(CacheBuilder::new().cache_size(2).build(CachePolicy::Lru).unwrap()),
    /// )
    /// .unwrap();
    /// assert_eq!(double.call(&21), Some(42));
    ///
    /// let missing = create_cached_selector(vec![InputSelector::new(|n: &i64| *n)], |v: &[i64]| v[0])
    ///     .build(CachedSelectorOptions::new());
    /// assert!(missing.is_err());
    /// ```
    pub fn build(self, config: impl Into<SelectorConfig<A, T, R>>) -> Result<CachedSelector<A, T, R>, ConfigError> {
        #[allow(deprecated)]
        let options = match config.into() {
            SelectorConfig::KeySelector(key_selector) => CachedSelectorOptions {
                key_selector: Some(key_selector),
                ..CachedSelectorOptions::new()
            },
            SelectorConfig::Options(options) => options,
            SelectorConfig::LegacyKeySelectorAndCreator { .. } => {
                return Err(ConfigError::new(LEGACY_SHAPE_MESSAGE));
            },
        };

        let key_selector = match options.key_selector_creator {
            Some(creator) => {
                debug!("deriving key selector from key selector creator");
                creator.create_key_selector(KeySelectorContext {
                    input_selectors: Rc::clone(&self.input_selectors),
                    result_fn: Rc::clone(&self.result_fn),
                    key_selector: options.key_selector,
                })
            },
            None => options
                .key_selector
                .ok_or_else(|| ConfigError::new(MISSING_KEY_SELECTOR_MESSAGE))?,
        };

        let cache = options
            .cache_object
            .unwrap_or_else(|| Box::new(FlatCache::<SelectorRef<A, R>, PrimitiveKeys>::new()));
        let selector_creator = options
            .selector_creator
            .unwrap_or_else(|| Box::new(MemoizedSelectorCreator));

        Ok(self.assemble(key_selector, cache, selector_creator))
    }
}

impl<A, T, R> CachedSelectorBuilder<A, T, R>
where
    A: ?Sized + 'static,
    T: 'static,
    R: 'static,
{
    fn assemble(
        self,
        key_selector: KeySelector<A>,
        cache: SelectorStore<A, R>,
        selector_creator: Box<dyn SelectorCreator<A, T, R>>,
    ) -> CachedSelector<A, T, R> {
        let recomputations = RecomputationCounter::new();
        let counting_result_fn = recomputations.wrap(Rc::clone(&self.result_fn));
        CachedSelector {
            cache,
            key_selector,
            dependencies: self.input_selectors,
            result_fn: self.result_fn,
            counting_result_fn,
            recomputations,
            selector_creator,
        }
    }
}

impl<A: ?Sized, T, R> fmt::Debug for CachedSelectorBuilder<A, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSelectorBuilder")
            .field("input_selectors", &self.input_selectors.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// CachedSelector
// ---------------------------------------------------------------------------

/// Selector that keeps one memoized instance per cache key.
pub struct CachedSelector<A: ?Sized, T, R> {
    cache: SelectorStore<A, R>,
    key_selector: KeySelector<A>,
    dependencies: Rc<[InputSelector<A, T>]>,
    result_fn: ResultFn<T, R>,
    counting_result_fn: ResultFn<T, R>,
    recomputations: RecomputationCounter,
    selector_creator: Box<dyn SelectorCreator<A, T, R>>,
}

impl<A: ?Sized + 'static, T: 'static, R: 'static> CachedSelector<A, T, R> {
    /// Runs the selector instance matching `args`, creating it on a miss.
    ///
    /// Returns `None` without touching the store when the key selector
    /// produces a key the store rejects; a warning is logged for each such
    /// call.
    pub fn call(&mut self, args: &A) -> Option<R> {
        let cache_key = (self.key_selector)(args);

        if let Some(is_valid) = self.cache.key_validator() {
            if !is_valid(&cache_key) {
                warn!(
                    cache_key = %cache_key,
                    kind = cache_key.kind(),
                    "invalid cache key has been returned by key selector function"
                );
                return None;
            }
        }

        let selector = match self.cache.get(&cache_key).cloned() {
            Some(selector) => selector,
            None => {
                let selector = self
                    .selector_creator
                    .create(&self.dependencies, Rc::clone(&self.counting_result_fn));
                self.cache.set(cache_key, Rc::clone(&selector));
                selector
            },
        };
        Some(selector.select(args))
    }

    /// Returns the stored instance for `args`, never creating one.
    ///
    /// This goes through the store's `get`, so on an LRU store it counts as
    /// a use and promotes the key.
    pub fn get_matching_selector(&mut self, args: &A) -> Option<SelectorRef<A, R>> {
        let cache_key = (self.key_selector)(args);
        self.cache.get(&cache_key).cloned()
    }

    /// Drops the stored instance for `args`, returning it.
    pub fn remove_matching_selector(&mut self, args: &A) -> Option<SelectorRef<A, R>> {
        let cache_key = (self.key_selector)(args);
        self.cache.remove(&cache_key)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Combiner runs across every key since creation or the last reset.
    pub fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    pub fn reset_recomputations(&self) {
        self.recomputations.reset();
    }

    /// The combiner as supplied, without recomputation counting.
    pub fn result_fn(&self) -> &ResultFn<T, R> {
        &self.result_fn
    }

    /// The input selectors, in declaration order.
    pub fn dependencies(&self) -> &[InputSelector<A, T>] {
        &self.dependencies
    }

    pub fn cache(&self) -> &dyn SelectorCache<SelectorRef<A, R>> {
        &*self.cache
    }

    pub fn cache_mut(&mut self) -> &mut dyn SelectorCache<SelectorRef<A, R>> {
        &mut *self.cache
    }

    pub fn key_selector(&self) -> &KeySelector<A> {
        &self.key_selector
    }

    /// Turns this cached selector into an input selector for another one.
    ///
    /// The returned input yields [`call`](Self::call)'s result and carries
    /// this selector's key selector, so the outer selector can combine keys
    /// with [`KeySelectorCombiner`](crate::key_selector::KeySelectorCombiner).
    /// A re-entrant call from inside this selector's own combiner yields
    /// `None`.
    pub fn into_input_selector(self) -> InputSelector<A, Option<R>> {
        let key_selector = Rc::clone(&self.key_selector);
        let cell = RefCell::new(self);
        let select: Rc<dyn Fn(&A) -> Option<R>> = Rc::new(move |args: &A| {
            let mut selector = cell.try_borrow_mut().ok()?;
            selector.call(args)
        });
        InputSelector::from_parts(select, Some(key_selector))
    }
}

impl<A: ?Sized, T, R> fmt::Debug for CachedSelector<A, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSelector")
            .field("cached_instances", &self.cache.len())
            .field("capacity", &self.cache.capacity())
            .field("dependencies", &self.dependencies.len())
            .field("recomputations", &self.recomputations.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ObjectKey;
    use crate::policy::fifo::FifoCache;
    use crate::policy::flat::FlatIdentityCache;
    use crate::policy::lru::LruCache;
    use crate::selector::PassthroughSelectorCreator;
    use std::cell::Cell;

    type Args = (&'static str, i64);

    fn builder() -> CachedSelectorBuilder<Args, i64, i64> {
        create_cached_selector(
            vec![
                InputSelector::new(|a: &Args| a.1),
                InputSelector::new(|a: &Args| a.0.len() as i64),
            ],
            |v: &[i64]| v[0] + v[1],
        )
    }

    fn by_name() -> CachedSelector<Args, i64, i64> {
        builder().with_key_selector(|a: &Args| CacheKey::from(a.0))
    }

    // ==============================================
    // Cache Retention
    // ==============================================

    mod retention {
        use super::*;

        #[test]
        fn same_key_reuses_instance() {
            let mut selector = by_name();
            assert_eq!(selector.call(&("foo", 1)), Some(4));
            assert_eq!(selector.call(&("foo", 1)), Some(4));
            assert_eq!(selector.recomputations(), 1);
            assert_eq!(selector.cache().len(), 1);
        }

        #[test]
        fn different_keys_build_separate_instances() {
            let mut selector = by_name();
            selector.call(&("foo", 1));
            selector.call(&("bar", 1));
            assert_eq!(selector.recomputations(), 2);
            assert_eq!(selector.cache().len(), 2);

            // both instances keep their memoized inputs
            selector.call(&("foo", 1));
            selector.call(&("bar", 1));
            assert_eq!(selector.recomputations(), 2);
        }

        #[test]
        fn instance_recomputes_when_inputs_change() {
            let mut selector = by_name();
            selector.call(&("foo", 1));
            selector.call(&("foo", 2));
            assert_eq!(selector.recomputations(), 2);
            assert_eq!(selector.cache().len(), 1);
        }

        #[test]
        fn reset_recomputations() {
            let mut selector = by_name();
            selector.call(&("foo", 1));
            selector.reset_recomputations();
            assert_eq!(selector.recomputations(), 0);
            selector.call(&("foo", 1));
            assert_eq!(selector.recomputations(), 0);
        }
    }

    // ==============================================
    // Management
    // ==============================================

    mod management {
        use super::*;

        #[test]
        fn get_matching_selector_does_not_create() {
            let mut selector = by_name();
            assert!(selector.get_matching_selector(&("foo", 1)).is_none());
            assert!(selector.cache().is_empty());

            selector.call(&("foo", 1));
            let instance = selector.get_matching_selector(&("foo", 9)).unwrap();
            assert_eq!(instance.recomputations(), 1);
        }

        #[test]
        fn remove_matching_selector_forces_rebuild() {
            let mut selector = by_name();
            selector.call(&("foo", 1));
            assert!(selector.remove_matching_selector(&("foo", 0)).is_some());
            assert!(selector.get_matching_selector(&("foo", 1)).is_none());

            selector.call(&("foo", 1));
            assert_eq!(selector.recomputations(), 2);
        }

        #[test]
        fn clear_cache_drops_every_instance() {
            let mut selector = by_name();
            for name in ["a", "b", "c"] {
                selector.call(&(name, 0));
            }
            selector.clear_cache();
            for name in ["a", "b", "c"] {
                assert!(selector.get_matching_selector(&(name, 0)).is_none());
            }
        }

        #[test]
        fn exposes_construction_parts() {
            let selector = by_name();
            assert_eq!(selector.dependencies().len(), 2);
            assert_eq!((selector.result_fn())(&[2, 3]), 5);
            assert_eq!((selector.key_selector())(&("k", 0)), CacheKey::from("k"));
            assert_eq!(selector.cache().capacity(), None);
            assert!(selector.cache().key_validator().is_some());
        }

        #[test]
        fn result_fn_calls_are_not_counted() {
            let selector = by_name();
            let _ = (selector.result_fn())(&[1, 1]);
            assert_eq!(selector.recomputations(), 0);
        }
    }

    // ==============================================
    // Configuration
    // ==============================================

    mod configuration {
        use super::*;

        #[test]
        fn options_without_key_selector_fail() {
            let err = builder().build(CachedSelectorOptions::new()).unwrap_err();
            assert!(err.message().contains("key_selector"));
        }

        #[test]
        #[allow(deprecated)]
        fn legacy_shape_fails() {
            let err = builder()
                .build(SelectorConfig::LegacyKeySelectorAndCreator {
                    key_selector: Rc::new(|a: &Args| CacheKey::from(a.0)),
                    selector_creator: Box::new(MemoizedSelectorCreator),
                })
                .unwrap_err();
            assert!(err.message().contains("not supported anymore"));
        }

        #[test]
        fn bare_key_selector_config() {
            let key_selector: KeySelector<Args> = Rc::new(|a: &Args| CacheKey::from(a.1));
            let mut selector = builder().build(key_selector).unwrap();
            assert_eq!(selector.call(&("ab", 3)), Some(5));
        }

        #[test]
        fn custom_cache_object() {
            let mut selector = builder()
                .build(
                    CachedSelectorOptions::new()
                        .key_selector(|a: &Args| CacheKey::from(a.1))
                        .cache_object(FifoCache::<SelectorRef<Args, i64>>::try_new(2).unwrap()),
                )
                .unwrap();
            for n in 0..3 {
                selector.call(&("x", n));
            }
            assert_eq!(selector.cache().len(), 2);
            assert!(selector.get_matching_selector(&("x", 0)).is_none());
        }

        #[test]
        fn custom_selector_creator() {
            let mut selector = builder()
                .build(
                    CachedSelectorOptions::new()
                        .key_selector(|a: &Args| CacheKey::from(a.0))
                        .selector_creator(PassthroughSelectorCreator),
                )
                .unwrap();
            selector.call(&("x", 1));
            selector.call(&("x", 1));
            assert_eq!(selector.recomputations(), 2);
        }

        #[test]
        fn key_selector_creator_runs_once_with_context() {
            let runs = Rc::new(Cell::new(0));
            let seen = Rc::clone(&runs);
            let mut selector = builder()
                .build(
                    CachedSelectorOptions::new()
                        .key_selector(|a: &Args| CacheKey::from(a.0))
                        .key_selector_creator(move |ctx: KeySelectorContext<Args, i64, i64>| -> KeySelector<Args> {
                            seen.set(seen.get() + 1);
                            assert_eq!(ctx.input_selectors.len(), 2);
                            assert_eq!((ctx.result_fn)(&[1, 2]), 3);
                            let inner = ctx.key_selector.unwrap();
                            Rc::new(move |a: &Args| CacheKey::from(format!("{}-{}", inner(a), a.1)))
                        }),
                )
                .unwrap();

            assert_eq!(runs.get(), 1);
            selector.call(&("foo", 7));
            selector.call(&("foo", 7));
            assert_eq!(runs.get(), 1);
            assert_eq!((selector.key_selector())(&("foo", 7)), CacheKey::from("foo-7"));
            assert!(selector.get_matching_selector(&("foo", 7)).is_some());
            assert_eq!(selector.recomputations(), 1);
        }
    }

    // ==============================================
    // Key Validity
    // ==============================================

    mod key_validity {
        use super::*;

        #[test]
        fn invalid_key_returns_none_without_touching_store() {
            let mut selector = builder().with_key_selector(|_: &Args| CacheKey::Null);
            assert_eq!(selector.call(&("x", 1)), None);
            assert!(selector.cache().is_empty());
            assert_eq!(selector.recomputations(), 0);
        }

        #[test]
        fn primitive_keys_are_accepted() {
            for key in [CacheKey::from(0), CacheKey::from(-5), CacheKey::from("12")] {
                let k = key.clone();
                let mut selector = builder().with_key_selector(move |_: &Args| k.clone());
                assert_eq!(selector.call(&("x", 1)), Some(2));
                assert!(selector.cache().contains(&key));
            }
        }

        #[test]
        fn identity_store_accepts_objects() {
            let handle = ObjectKey::new(());
            let key = CacheKey::from(handle);
            let k = key.clone();
            let mut selector = builder()
                .build(
                    CachedSelectorOptions::new()
                        .key_selector(move |_: &Args| k.clone())
                        .cache_object(FlatIdentityCache::new()),
                )
                .unwrap();
            assert_eq!(selector.call(&("x", 1)), Some(2));
            assert!(selector.cache().contains(&key));
        }
    }

    // ==============================================
    // LRU Interaction
    // ==============================================

    #[test]
    fn get_matching_selector_promotes_on_lru_store() {
        let mut selector = builder()
            .build(
                CachedSelectorOptions::new()
                    .key_selector(|a: &Args| CacheKey::from(a.1))
                    .cache_object(LruCache::<SelectorRef<Args, i64>>::try_new(2).unwrap()),
            )
            .unwrap();
        selector.call(&("x", 1));
        selector.call(&("x", 2));
        selector.get_matching_selector(&("x", 1));
        selector.call(&("x", 3));

        assert!(selector.cache().contains(&CacheKey::from(1)));
        assert!(!selector.cache().contains(&CacheKey::from(2)));
    }

    // ==============================================
    // Nesting
    // ==============================================

    #[test]
    fn nested_cached_selector_as_input() {
        let inner = by_name();
        let mut outer = create_cached_selector(vec![inner.into_input_selector()], |v: &[Option<i64>]| {
            v[0].map(|n| n * 10)
        })
        .with_key_selector(|a: &Args| CacheKey::from(a.1));

        assert_eq!(outer.call(&("abc", 1)), Some(Some(40)));
        assert_eq!(outer.dependencies()[0].key_selector().map(|k| k(&("abc", 1))), Some(CacheKey::from("abc")));
    }
}
