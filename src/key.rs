//! Cache keys produced by key selectors.
//!
//! A [`CacheKey`] is a small dynamically-typed value. Which keys a store
//! accepts is decided by the store's key domain, not by the key itself:
//!
//! ```text
//!   CacheKey
//!   ├── Str("user:7")   ┐
//!   ├── Int(42)         ├─ primitive: compared by value, accepted everywhere
//!   ├── Float(1.5)      ┘
//!   ├── Bool(true)      ┐
//!   ├── Object(handle)  ├─ rejected by primitive-domain stores,
//!   └── Null            ┘  accepted by identity-domain stores
//! ```
//!
//! Numbers compare by numeric value across variants, so `Int(1)` and
//! `Float(1.0)` address the same entry. [`ObjectKey`] compares by allocation
//! identity: two handles are equal only when they point at the same value.
//!
//! ## Example
//!
//! ```
//! use selectkit::key::{CacheKey, ObjectKey};
//!
//! assert_eq!(CacheKey::from(1), CacheKey::from(1.0));
//! assert_eq!(CacheKey::from("a"), CacheKey::from(String::from("a")));
//!
//! let obj = ObjectKey::new(vec![1, 2, 3]);
//! let same = obj.clone();
//! let other = ObjectKey::new(vec![1, 2, 3]);
//! assert_eq!(CacheKey::from(obj.clone()), CacheKey::from(same));
//! assert_ne!(CacheKey::from(obj), CacheKey::from(other));
//! ```

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Largest magnitude at which every `f64` integer is also an exact `i64`.
const I64_EXACT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A key computed per call by a key selector.
#[derive(Clone)]
pub enum CacheKey {
    /// String key, compared by content.
    Str(Rc<str>),
    /// Integer key, compared numerically.
    Int(i64),
    /// Floating point key, compared numerically; NaN equals NaN.
    Float(f64),
    /// Boolean key. Not a primitive cache key.
    Bool(bool),
    /// Arbitrary value compared by identity.
    Object(ObjectKey),
    /// Absent value.
    Null,
}

impl CacheKey {
    /// Returns `true` for string and number keys.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        is_string_or_number(self)
    }

    /// Returns the string content of a `Str` key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheKey::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the identity handle of an `Object` key.
    pub fn as_object(&self) -> Option<&ObjectKey> {
        match self {
            CacheKey::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Str(_) => "string",
            CacheKey::Int(_) | CacheKey::Float(_) => "number",
            CacheKey::Bool(_) => "bool",
            CacheKey::Object(_) => "object",
            CacheKey::Null => "null",
        }
    }

    /// Integer view of a float, when it holds an exact `i64` value.
    #[inline]
    fn integral(f: f64) -> Option<i64> {
        if f.fract() == 0.0 && f >= -I64_EXACT_BOUND && f < I64_EXACT_BOUND {
            Some(f as i64)
        } else {
            None
        }
    }
}

/// Returns `true` iff `key` is a string or a number.
///
/// This is the validity predicate of primitive-domain stores.
#[inline]
pub fn is_string_or_number(key: &CacheKey) -> bool {
    matches!(key, CacheKey::Str(_) | CacheKey::Int(_) | CacheKey::Float(_))
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CacheKey::Str(a), CacheKey::Str(b)) => a == b,
            (CacheKey::Int(a), CacheKey::Int(b)) => a == b,
            (CacheKey::Float(a), CacheKey::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (CacheKey::Int(i), CacheKey::Float(f)) | (CacheKey::Float(f), CacheKey::Int(i)) => {
                CacheKey::integral(*f) == Some(*i)
            },
            (CacheKey::Bool(a), CacheKey::Bool(b)) => a == b,
            (CacheKey::Object(a), CacheKey::Object(b)) => a == b,
            (CacheKey::Null, CacheKey::Null) => true,
            _ => false,
        }
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CacheKey::Str(s) => {
                state.write_u8(0);
                s.hash(state);
            },
            CacheKey::Int(i) => {
                state.write_u8(1);
                i.hash(state);
            },
            CacheKey::Float(f) => match CacheKey::integral(*f) {
                Some(i) => {
                    state.write_u8(1);
                    i.hash(state);
                },
                None if f.is_nan() => {
                    state.write_u8(2);
                    f64::NAN.to_bits().hash(state);
                },
                None => {
                    state.write_u8(2);
                    f.to_bits().hash(state);
                },
            },
            CacheKey::Bool(b) => {
                state.write_u8(3);
                b.hash(state);
            },
            CacheKey::Object(obj) => {
                state.write_u8(4);
                obj.hash(state);
            },
            CacheKey::Null => state.write_u8(5),
        }
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Str(s) => f.debug_tuple("Str").field(&&**s).finish(),
            CacheKey::Int(i) => f.debug_tuple("Int").field(i).finish(),
            CacheKey::Float(x) => f.debug_tuple("Float").field(x).finish(),
            CacheKey::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            CacheKey::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            CacheKey::Null => f.write_str("Null"),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Str(s) => f.write_str(s),
            CacheKey::Int(i) => write!(f, "{}", i),
            CacheKey::Float(x) => write!(f, "{}", x),
            CacheKey::Bool(b) => write!(f, "{}", b),
            CacheKey::Object(obj) => write!(f, "{:?}", obj),
            CacheKey::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::Str(Rc::from(value))
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey::Str(Rc::from(value))
    }
}

impl From<&String> for CacheKey {
    fn from(value: &String) -> Self {
        CacheKey::Str(Rc::from(value.as_str()))
    }
}

impl From<Rc<str>> for CacheKey {
    fn from(value: Rc<str>) -> Self {
        CacheKey::Str(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CacheKey {
                fn from(value: $t) -> Self {
                    CacheKey::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for CacheKey {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(i) => CacheKey::Int(i),
            Err(_) => CacheKey::Float(value as f64),
        }
    }
}

impl From<u64> for CacheKey {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => CacheKey::Int(i),
            Err(_) => CacheKey::Float(value as f64),
        }
    }
}

impl From<f64> for CacheKey {
    fn from(value: f64) -> Self {
        CacheKey::Float(value)
    }
}

impl From<f32> for CacheKey {
    fn from(value: f32) -> Self {
        CacheKey::Float(f64::from(value))
    }
}

impl From<bool> for CacheKey {
    fn from(value: bool) -> Self {
        CacheKey::Bool(value)
    }
}

impl From<ObjectKey> for CacheKey {
    fn from(value: ObjectKey) -> Self {
        CacheKey::Object(value)
    }
}

impl From<()> for CacheKey {
    fn from(_: ()) -> Self {
        CacheKey::Null
    }
}

impl<T: Into<CacheKey>> From<Option<T>> for CacheKey {
    fn from(value: Option<T>) -> Self {
        value.map_or(CacheKey::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// ObjectKey
// ---------------------------------------------------------------------------

/// Identity handle for an arbitrary value.
///
/// Cloning the handle shares the allocation, so clones compare equal.
/// Two independently created handles never compare equal, whatever their
/// contents.
#[derive(Clone)]
pub struct ObjectKey(Rc<dyn Any>);

impl ObjectKey {
    /// Allocates `value` and returns a handle to it.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Wraps an existing shared allocation without copying it.
    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Returns the referenced value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Address used for equality and hashing.
    #[inline]
    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.addr() as usize).hash(state);
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:p})", self.addr())
    }
}
