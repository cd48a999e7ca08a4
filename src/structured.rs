//! Cached selector assembling a named record from named input selectors.
//!
//! The combiner is generated: it pairs every field name with the value its
//! input selector extracted. Everything else is the regular
//! [`CachedSelectorBuilder`] flow.
//!
//! ```
//! use selectkit::key::CacheKey;
//! use selectkit::selector::InputSelector;
//! use selectkit::structured::create_structured_cached_selector;
//!
//! type Args = (i32, i32);
//!
//! let mut record = create_structured_cached_selector([
//!     ("left", InputSelector::new(|a: &Args| a.0)),
//!     ("right", InputSelector::new(|a: &Args| a.1)),
//! ])
//! .with_key_selector(|a: &Args| CacheKey::from(a.0));
//!
//! let result = record.call(&(1, 2)).unwrap();
//! assert_eq!(result["left"], 1);
//! assert_eq!(result["right"], 2);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::cached::CachedSelectorBuilder;
use crate::selector::{InputSelector, ResultFn};

/// Record produced by a structured cached selector.
pub type Structured<T> = BTreeMap<String, T>;

/// Creates a cached selector builder whose result maps each field name to
/// its input selector's value.
///
/// When a name repeats, the later field wins.
pub fn create_structured_cached_selector<A, T, N>(
    fields: impl IntoIterator<Item = (N, InputSelector<A, T>)>,
) -> CachedSelectorBuilder<A, T, Structured<T>>
where
    A: ?Sized + 'static,
    T: Clone + 'static,
    N: Into<String>,
{
    let (names, input_selectors): (Vec<String>, Vec<InputSelector<A, T>>) = fields
        .into_iter()
        .map(|(name, input)| (name.into(), input))
        .unzip();

    let result_fn: ResultFn<T, Structured<T>> = Rc::new(move |values: &[T]| {
        names
            .iter()
            .cloned()
            .zip(values.iter().cloned())
            .collect::<Structured<T>>()
    });

    CachedSelectorBuilder::from_parts(Rc::from(input_selectors), result_fn)
}
