//! Ordering relations for the flat containers.
//!
//! A comparator orders a container's stored keys against each other through
//! `Compare<K>` (shorthand for `Compare<K, K>`). A comparator may additionally implement
//! `Compare<K, Q>` for some other query type `Q`, which unlocks lookups by `&Q` without building a
//! full key. This is the transparent-comparison capability: a comparator that does not declare it
//! simply does not offer those lookups.
//!
//! # Examples
//!
//! ```
//! use core::cmp::Ordering;
//! use flat_collections::{Compare, FlatSet};
//!
//! /// Orders `(id, name)` records by `id` only, and lets callers query by a bare `id`.
//! #[derive(Clone, Copy, Default)]
//! struct ById;
//!
//! impl Compare<(u32, &str)> for ById {
//!     fn compare(&self, lhs: &(u32, &str), rhs: &(u32, &str)) -> Ordering {
//!         lhs.0.cmp(&rhs.0)
//!     }
//! }
//!
//! impl Compare<(u32, &str), u32> for ById {
//!     fn compare(&self, lhs: &(u32, &str), rhs: &u32) -> Ordering {
//!         lhs.0.cmp(rhs)
//!     }
//! }
//!
//! let mut staff = FlatSet::with_comparator(ById);
//! staff.insert((7, "Grace"));
//! staff.insert((3, "Ada"));
//! assert_eq!(staff.get(&3u32), Some(&(3, "Ada")));
//! ```

use core::borrow::Borrow;
use core::cmp::Ordering;

/// A strict weak ordering between a stored key `L` and a query `R`.
///
/// `compare(lhs, rhs)` must be consistent with the ordering the container was sorted by: for a
/// stored key `k` and query `q`, the result must equal the ordering between `k` and the stored key
/// that `q` stands for.
pub trait Compare<L: ?Sized, R: ?Sized = L> {
    /// Compares `lhs` with `rhs`.
    fn compare(&self, lhs: &L, rhs: &R) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
///
/// `Natural` is transparent over [`Borrow`]: a container keyed by `String` can be queried with a
/// `&str`, exactly as with the standard library's ordered collections.
///
/// # Examples
///
/// ```
/// use flat_collections::FlatSet;
///
/// let set = FlatSet::from([String::from("b"), String::from("a")]);
/// assert!(set.contains("a"));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K, Q> Compare<K, Q> for Natural
where
    K: ?Sized + Borrow<Q>,
    Q: ?Sized + Ord,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &Q) -> Ordering {
        lhs.borrow().cmp(rhs)
    }
}

/// Reverses the ordering of the wrapped comparator.
///
/// # Examples
///
/// ```
/// use flat_collections::{FlatSet, Natural, Reverse};
///
/// let set = FlatSet::from_iter_with([1, 3, 2], Reverse(Natural));
/// assert_eq!(set.as_slice(), &[3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reverse<C>(pub C);

impl<L, R, C> Compare<L, R> for Reverse<C>
where
    L: ?Sized,
    R: ?Sized,
    C: Compare<L, R>,
{
    #[inline]
    fn compare(&self, lhs: &L, rhs: &R) -> Ordering {
        self.0.compare(lhs, rhs).reverse()
    }
}

/// Adapts a closure into a comparator.
///
/// # Examples
///
/// ```
/// use flat_collections::{FlatMultiSet, FnCompare};
///
/// let by_len = FnCompare(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// let mut words = FlatMultiSet::with_comparator(by_len);
/// words.insert("ccc");
/// words.insert("a");
/// words.insert("bb");
/// words.insert("z");
/// assert_eq!(words.as_slice(), &["a", "z", "bb", "ccc"]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FnCompare<F>(pub F);

impl<K, F> Compare<K> for FnCompare<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        (self.0)(lhs, rhs)
    }
}
