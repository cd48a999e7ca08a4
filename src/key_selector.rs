//! Key selector creators.
//!
//! A [`KeySelectorCreator`] runs once when a cached selector is built and
//! derives the key selector from the same pieces used to build the selector
//! instances. Any `Fn(KeySelectorContext<A, T, R>) -> KeySelector<A>` closure
//! is a creator.
//!
//! [`KeySelectorCombiner`] is the stock creator for nested cached selectors:
//! it collects the key selectors carried by the input selectors and joins
//! their string and number fragments into one string key.
//!
//! ```text
//!   inputs: [ cachedA (key "a"), plainB, cachedC (key 7) ]
//!   extra_key_selector: "x"
//!
//!   combined key = "x" + ":" + "a" + ":" + "7"  →  Str("x:a:7")
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use selectkit::cached::{CachedSelectorOptions, create_cached_selector};
//! use selectkit::key::CacheKey;
//! use selectkit::key_selector::KeySelectorCombiner;
//! use selectkit::selector::InputSelector;
//!
//! type Args = (String, u32);
//!
//! let by_name = create_cached_selector(
//!     vec![InputSelector::new(|a: &Args| a.1)],
//!     |v: &[u32]| v[0] * 2,
//! )
//! .with_key_selector(|a: &Args| CacheKey::from(a.0.as_str()));
//!
//! let mut outer = create_cached_selector(
//!     vec![by_name.into_input_selector()],
//!     |v: &[Option<u32>]| v[0].unwrap_or(0) + 1,
//! )
//! .build(
//!     CachedSelectorOptions::new()
//!         .key_selector_creator(KeySelectorCombiner::new().extra_key_selector(|a: &Args| CacheKey::from(a.1))),
//! )
//! .unwrap();
//!
//! assert_eq!(outer.call(&("bob".to_string(), 4)), Some(9));
//! assert_eq!((outer.key_selector())(&("bob".to_string(), 4)), CacheKey::from("4:bob"));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::key::CacheKey;
use crate::selector::{InputSelector, KeySelector, ResultFn};

/// What a key selector creator is given.
pub struct KeySelectorContext<A: ?Sized, T, R> {
    pub input_selectors: Rc<[InputSelector<A, T>]>,
    /// The combiner as supplied by the caller, without recomputation counting.
    pub result_fn: ResultFn<T, R>,
    /// Key selector supplied alongside the creator, if any.
    pub key_selector: Option<KeySelector<A>>,
}

/// Derives a key selector at construction time.
pub trait KeySelectorCreator<A: ?Sized, T, R> {
    fn create_key_selector(&self, context: KeySelectorContext<A, T, R>) -> KeySelector<A>;
}

impl<A, T, R, F> KeySelectorCreator<A, T, R> for F
where
    A: ?Sized,
    F: Fn(KeySelectorContext<A, T, R>) -> KeySelector<A>,
{
    fn create_key_selector(&self, context: KeySelectorContext<A, T, R>) -> KeySelector<A> {
        self(context)
    }
}

/// Builds a key selector out of the input selectors' own key selectors.
pub struct KeySelectorCombiner<A: ?Sized> {
    separator: Rc<str>,
    extra_key_selector: Option<KeySelector<A>>,
}

impl<A: ?Sized + 'static> KeySelectorCombiner<A> {
    /// Combiner joining fragments with `":"`.
    pub fn new() -> Self {
        Self {
            separator: Rc::from(":"),
            extra_key_selector: None,
        }
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Rc::from(separator.into());
        self
    }

    /// Key selector whose fragment is placed first.
    pub fn extra_key_selector(mut self, key_selector: impl Fn(&A) -> CacheKey + 'static) -> Self {
        self.extra_key_selector = Some(Rc::new(key_selector));
        self
    }

    /// Combines the key selectors carried by `input_selectors`.
    pub fn combine<T>(&self, input_selectors: &[InputSelector<A, T>]) -> KeySelector<A> {
        let key_selectors: Vec<KeySelector<A>> = self
            .extra_key_selector
            .iter()
            .cloned()
            .chain(input_selectors.iter().filter_map(|input| input.key_selector().cloned()))
            .collect();
        join_key_selectors(key_selectors, Rc::clone(&self.separator))
    }
}

impl<A: ?Sized + 'static> Default for KeySelectorCombiner<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static, T, R> KeySelectorCreator<A, T, R> for KeySelectorCombiner<A> {
    fn create_key_selector(&self, context: KeySelectorContext<A, T, R>) -> KeySelector<A> {
        self.combine(&context.input_selectors)
    }
}

impl<A: ?Sized> fmt::Debug for KeySelectorCombiner<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySelectorCombiner")
            .field("separator", &&*self.separator)
            .field("has_extra_key_selector", &self.extra_key_selector.is_some())
            .finish()
    }
}

/// Joins the key selectors carried by `input_selectors` with `":"`.
pub fn combine_key_selectors<A: ?Sized + 'static, T>(input_selectors: &[InputSelector<A, T>]) -> KeySelector<A> {
    KeySelectorCombiner::new().combine(input_selectors)
}

fn join_key_selectors<A: ?Sized + 'static>(key_selectors: Vec<KeySelector<A>>, separator: Rc<str>) -> KeySelector<A> {
    Rc::new(move |args: &A| {
        let fragments: Vec<String> = key_selectors
            .iter()
            .map(|key_selector| key_selector(args))
            // non string/number fragments are dropped
            .filter(|key| key.is_primitive())
            .map(|key| key.to_string())
            .collect();
        CacheKey::from(fragments.join(&*separator))
    })
}
