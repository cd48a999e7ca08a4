//! Memoized selector instances and the factories that build them.
//!
//! A *selector* turns call arguments into a derived value: each
//! [`InputSelector`] extracts one input from the arguments and a
//! [`ResultFn`] combines the extracted inputs. A [`SelectorCreator`] decides
//! how a single selector instance memoizes that computation.
//!
//! ```text
//!   args ──► InputSelector_1 ──┐
//!        ──► InputSelector_2 ──┼──► [T; n] ──► ResultFn ──► R
//!        ──► InputSelector_n ──┘
//! ```
//!
//! | Creator                      | Re-runs the combiner when           |
//! |------------------------------|-------------------------------------|
//! | [`MemoizedSelectorCreator`]  | extracted inputs differ (`!=`)      |
//! | [`PassthroughSelectorCreator`] | every call                        |
//!
//! ## Example Usage
//!
//! ```
//! use std::rc::Rc;
//! use selectkit::selector::{InputSelector, MemoizedSelectorCreator, SelectorCreator};
//!
//! let inputs = vec![
//!     InputSelector::new(|s: &(i32, i32)| s.0),
//!     InputSelector::new(|s: &(i32, i32)| s.1),
//! ];
//! let selector = MemoizedSelectorCreator.create(&inputs, Rc::new(|v: &[i32]| v[0] + v[1]));
//!
//! assert_eq!(selector.select(&(1, 2)), 3);
//! assert_eq!(selector.select(&(1, 2)), 3);
//! assert_eq!(selector.recomputations(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::key::CacheKey;

/// Combiner receiving the extracted inputs in declaration order.
pub type ResultFn<T, R> = Rc<dyn Fn(&[T]) -> R>;

/// Maps call arguments to a cache key.
pub type KeySelector<A> = Rc<dyn Fn(&A) -> CacheKey>;

/// Shared handle to a selector instance, as held by a store.
pub type SelectorRef<A, R> = Rc<dyn Selector<A, R>>;

/// Extracts one input from the call arguments.
///
/// An input selector may carry a key selector, which is how a nested cached
/// selector exposes its own key to [`KeySelectorCombiner`](crate::key_selector::KeySelectorCombiner).
pub struct InputSelector<A: ?Sized, T> {
    select: Rc<dyn Fn(&A) -> T>,
    key_selector: Option<KeySelector<A>>,
}

impl<A: ?Sized + 'static, T: 'static> InputSelector<A, T> {
    pub fn new(select: impl Fn(&A) -> T + 'static) -> Self {
        Self {
            select: Rc::new(select),
            key_selector: None,
        }
    }

    /// Attaches a key selector to this input.
    pub fn with_key_selector(mut self, key_selector: impl Fn(&A) -> CacheKey + 'static) -> Self {
        self.key_selector = Some(Rc::new(key_selector));
        self
    }

    pub(crate) fn from_parts(
        select: Rc<dyn Fn(&A) -> T>,
        key_selector: Option<KeySelector<A>>,
    ) -> Self {
        Self {
            select,
            key_selector,
        }
    }
}

impl<A: ?Sized, T> InputSelector<A, T> {
    #[inline]
    pub fn select(&self, args: &A) -> T {
        (self.select)(args)
    }

    /// Key selector carried by this input, if any.
    pub fn key_selector(&self) -> Option<&KeySelector<A>> {
        self.key_selector.as_ref()
    }

    /// Returns `true` if both handles share the same extraction closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.select, &other.select)
    }
}

impl<A: ?Sized, T> Clone for InputSelector<A, T> {
    fn clone(&self) -> Self {
        Self {
            select: Rc::clone(&self.select),
            key_selector: self.key_selector.clone(),
        }
    }
}

impl<A: ?Sized, T> fmt::Debug for InputSelector<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSelector")
            .field("has_key_selector", &self.key_selector.is_some())
            .finish_non_exhaustive()
    }
}

/// One memoized computation instance.
pub trait Selector<A: ?Sized, R> {
    /// Computes (or recalls) the result for `args`.
    fn select(&self, args: &A) -> R;

    /// Number of times this instance ran its combiner.
    fn recomputations(&self) -> u64;

    fn reset_recomputations(&self);
}

/// Builds selector instances from input selectors and a combiner.
///
/// The cached selector calls this once per cache miss.
pub trait SelectorCreator<A: ?Sized, T, R> {
    fn create(&self, inputs: &[InputSelector<A, T>], result_fn: ResultFn<T, R>) -> SelectorRef<A, R>;
}

/// Shared counter of combiner runs.
///
/// Clones observe the same count.
#[derive(Debug, Clone, Default)]
pub struct RecomputationCounter(Rc<Cell<u64>>);

impl RecomputationCounter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }

    /// Wraps `result_fn` so every run increments this counter.
    pub fn wrap<T: 'static, R: 'static>(&self, result_fn: ResultFn<T, R>) -> ResultFn<T, R> {
        let counter = self.clone();
        Rc::new(move |inputs: &[T]| {
            counter.incr();
            result_fn(inputs)
        })
    }
}

// ---------------------------------------------------------------------------
// MemoizedSelectorCreator
// ---------------------------------------------------------------------------

/// Default creator: recomputes only when the extracted inputs change.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoizedSelectorCreator;

struct MemoizedSelector<A: ?Sized, T, R> {
    inputs: Vec<InputSelector<A, T>>,
    result_fn: ResultFn<T, R>,
    last: RefCell<Option<(Vec<T>, R)>>,
    recomputations: RecomputationCounter,
}

impl<A, T, R> Selector<A, R> for MemoizedSelector<A, T, R>
where
    A: ?Sized,
    T: PartialEq,
    R: Clone,
{
    fn select(&self, args: &A) -> R {
        let extracted: Vec<T> = self.inputs.iter().map(|input| input.select(args)).collect();
        if let Some((previous, result)) = self.last.borrow().as_ref() {
            if *previous == extracted {
                return result.clone();
            }
        }

        self.recomputations.incr();
        let result = (self.result_fn)(&extracted);
        *self.last.borrow_mut() = Some((extracted, result.clone()));
        result
    }

    fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    fn reset_recomputations(&self) {
        self.recomputations.reset();
    }
}

impl<A, T, R> SelectorCreator<A, T, R> for MemoizedSelectorCreator
where
    A: ?Sized + 'static,
    T: PartialEq + 'static,
    R: Clone + 'static,
{
    fn create(&self, inputs: &[InputSelector<A, T>], result_fn: ResultFn<T, R>) -> SelectorRef<A, R> {
        Rc::new(MemoizedSelector {
            inputs: inputs.to_vec(),
            result_fn,
            last: RefCell::new(None),
            recomputations: RecomputationCounter::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// PassthroughSelectorCreator
// ---------------------------------------------------------------------------

/// Creator whose instances run the combiner on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSelectorCreator;

struct PassthroughSelector<A: ?Sized, T, R> {
    inputs: Vec<InputSelector<A, T>>,
    result_fn: ResultFn<T, R>,
    recomputations: RecomputationCounter,
}

impl<A: ?Sized, T, R> Selector<A, R> for PassthroughSelector<A, T, R> {
    fn select(&self, args: &A) -> R {
        let extracted: Vec<T> = self.inputs.iter().map(|input| input.select(args)).collect();
        self.recomputations.incr();
        (self.result_fn)(&extracted)
    }

    fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    fn reset_recomputations(&self) {
        self.recomputations.reset();
    }
}

impl<A, T, R> SelectorCreator<A, T, R> for PassthroughSelectorCreator
where
    A: ?Sized + 'static,
    T: 'static,
    R: 'static,
{
    fn create(&self, inputs: &[InputSelector<A, T>], result_fn: ResultFn<T, R>) -> SelectorRef<A, R> {
        Rc::new(PassthroughSelector {
            inputs: inputs.to_vec(),
            result_fn,
            recomputations: RecomputationCounter::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = (u32, u32);

    fn inputs() -> Vec<InputSelector<State, u32>> {
        vec![
            InputSelector::new(|s: &State| s.0),
            InputSelector::new(|s: &State| s.1),
        ]
    }

    fn sum() -> ResultFn<u32, u32> {
        Rc::new(|v: &[u32]| v.iter().sum::<u32>())
    }

    mod memoized {
        use super::*;

        #[test]
        fn reuses_result_for_equal_inputs() {
            let selector = MemoizedSelectorCreator.create(&inputs(), sum());
            assert_eq!(selector.select(&(2, 3)), 5);
            assert_eq!(selector.select(&(2, 3)), 5);
            assert_eq!(selector.recomputations(), 1);
        }

        #[test]
        fn recomputes_when_inputs_change() {
            let selector = MemoizedSelectorCreator.create(&inputs(), sum());
            selector.select(&(1, 1));
            selector.select(&(1, 2));
            selector.select(&(1, 2));
            assert_eq!(selector.recomputations(), 2);

            selector.reset_recomputations();
            assert_eq!(selector.recomputations(), 0);
        }

        #[test]
        fn only_most_recent_inputs_are_remembered() {
            let selector = MemoizedSelectorCreator.create(&inputs(), sum());
            selector.select(&(1, 1));
            selector.select(&(2, 2));
            selector.select(&(1, 1));
            assert_eq!(selector.recomputations(), 3);
        }
    }

    mod passthrough {
        use super::*;

        #[test]
        fn recomputes_every_call() {
            let selector = PassthroughSelectorCreator.create(&inputs(), sum());
            for _ in 0..3 {
                assert_eq!(selector.select(&(4, 4)), 8);
            }
            assert_eq!(selector.recomputations(), 3);
        }
    }

    mod counter {
        use super::*;

        #[test]
        fn wrapped_combiner_counts_runs() {
            let counter = RecomputationCounter::new();
            let wrapped = counter.wrap(sum());
            assert_eq!(wrapped(&[1, 2]), 3);
            assert_eq!(wrapped(&[3]), 3);
            assert_eq!(counter.get(), 2);

            let shared = counter.clone();
            shared.reset();
            assert_eq!(counter.get(), 0);
        }
    }

    mod input_selector {
        use super::*;

        #[test]
        fn carries_optional_key_selector() {
            let plain = InputSelector::new(|s: &State| s.0);
            assert!(plain.key_selector().is_none());

            let keyed = plain.clone().with_key_selector(|s: &State| CacheKey::from(s.1));
            let key_fn = keyed.key_selector().unwrap();
            assert_eq!(key_fn(&(0, 9)), CacheKey::from(9));
            assert!(plain.ptr_eq(&keyed));
        }

        #[test]
        fn unsized_arguments() {
            let len = InputSelector::new(|s: &str| s.len());
            assert_eq!(len.select("abcd"), 4);
        }
    }
}
