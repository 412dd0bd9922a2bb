use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Range, RangeBounds};
use core::slice;

use crate::allocator::{Allocator, Global};
use crate::compare::{Compare, Natural};
use crate::raw::{self, FlatTree, Identity};

mod capacity;

/// An ordered set stored as a single sorted array.
///
/// Elements live contiguously in ascending order under the comparator `C`. Lookups are binary
/// searches, iteration is a slice walk, and [`as_slice`](Self::as_slice) exposes the storage
/// directly. Inserting or removing shifts the elements after the affected position, so both are
/// O(n); sorted input inserted through [`insert_hint`](Self::insert_hint) or [`Extend`] avoids
/// most of the search cost.
///
/// Positions returned by [`insert_full`](Self::insert_full), [`find`](Self::find) and friends are
/// indices into [`as_slice`](Self::as_slice). Any insertion or removal at or before a position
/// invalidates it.
///
/// It is a logic error for an element to be modified in such a way that its ordering relative to
/// any other element, as determined by `C`, changes while it is in the set. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated to the `FlatSet`
/// that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use flat_collections::FlatSet;
///
/// let mut books = FlatSet::new();
///
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
pub struct FlatSet<T, C = Natural, A: Allocator = Global> {
    tree: FlatTree<T, Identity, C, A>,
}

/// An iterator over the elements of a sorted flat container.
///
/// This `struct` is created by the [`iter`] and [`range`] methods on [`FlatSet`] and
/// [`FlatMultiSet`](crate::FlatMultiSet).
///
/// # Examples
///
/// ```
/// use flat_collections::FlatSet;
///
/// let set = FlatSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.as_slice(), &[2]);
/// ```
///
/// [`iter`]: FlatSet::iter
/// [`range`]: FlatSet::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    inner: slice::Iter<'a, T>,
}

/// An owning iterator over the elements of a sorted flat container, in order.
///
/// This `struct` is created by the `into_iter` method on [`FlatSet`] and
/// [`FlatMultiSet`](crate::FlatMultiSet) (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T, A: Allocator = Global> {
    inner: raw::IntoIter<T, A>,
}

impl<T> FlatSet<T> {
    /// Makes a new, empty `FlatSet` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set: FlatSet<i32> = FlatSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator_in(Natural, Global)
    }
}

impl<T, C> FlatSet<T, C> {
    /// Makes a new, empty `FlatSet` ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_in(cmp, Global)
    }

    /// Builds a set ordered by `cmp` from `iter`. When several elements are equivalent, the first
    /// one wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::{FlatSet, FnCompare};
    ///
    /// let by_abs = FnCompare(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
    /// let set = FlatSet::from_iter_with([-2, 1, 2, -1], by_abs);
    /// assert_eq!(set.as_slice(), &[1, -2]);
    /// ```
    pub fn from_iter_with<I>(iter: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = T>,
        C: Compare<T>,
    {
        Self::from_iter_with_in(iter, cmp, Global)
    }
}

impl<T, A: Allocator> FlatSet<T, Natural, A> {
    /// Makes a new, empty `FlatSet` ordered by [`Ord`] that allocates from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self::with_comparator_in(Natural, alloc)
    }
}

impl<T, C, A: Allocator> FlatSet<T, C, A> {
    /// Makes a new, empty `FlatSet` ordered by `cmp` that allocates from `alloc`.
    #[must_use]
    pub const fn with_comparator_in(cmp: C, alloc: A) -> Self {
        FlatSet {
            tree: FlatTree::new_in(cmp, alloc),
        }
    }

    /// Builds a set ordered by `cmp` from `iter`, allocated from `alloc`. When several elements are equivalent, the first one wins.
    pub fn from_iter_with_in<I>(iter: I, cmp: C, alloc: A) -> Self
    where
        I: IntoIterator<Item = T>,
        C: Compare<T>,
    {
        let mut set = Self::with_comparator_in(cmp, alloc);
        set.tree.extend_unique(iter);
        set
    }

    /// Clones the set into a new one that allocates from `alloc`.
    #[must_use]
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> FlatSet<T, C, B>
    where
        T: Clone,
        C: Clone,
    {
        FlatSet {
            tree: self.tree.clone_in(alloc),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the comparator that orders the set.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Returns the allocator the set allocates from.
    #[must_use]
    pub const fn allocator(&self) -> &A {
        self.tree.allocator()
    }

    /// Returns the elements as a sorted slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let set = FlatSet::from([3, 1, 2, 1]);
    /// assert_eq!(set.as_slice(), &[1, 2, 3]);
    /// ```
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.tree.as_slice()
    }

    /// Gets an iterator that visits the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.as_slice().iter(),
        }
    }

    /// Returns the element at position `index`, if any.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the first (minimum) element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Returns the last (maximum) element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Removes and returns the first element, if any.
    ///
    /// # Complexity
    ///
    /// O(n), every remaining element shifts down by one.
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Removes and returns the last element, if any.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

    /// Clears the set, removing all elements. The capacity is kept.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Removes and returns the element at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_index(&mut self, index: usize) -> T {
        self.tree.remove_index(index)
    }

    /// Removes the elements at the positions in `range` and returns the position of the element
    /// that followed them.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set = FlatSet::from([1, 2, 3, 4, 5]);
    /// assert_eq!(set.remove_range(1..3), 1);
    /// assert_eq!(set.as_slice(), &[1, 4, 5]);
    /// ```
    pub fn remove_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let range = raw::index_range(&range, self.len());
        self.tree.remove_range(range)
    }

    /// Retains only the elements specified by the predicate, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set: FlatSet<i32> = (1..=6).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.as_slice(), &[2, 4, 6]);
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.tree.retain(|value| keep(value));
    }

    /// Returns `true` if the set contains an element equivalent to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.contains(value)
    }

    /// Returns a reference to the element equivalent to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.get(value)
    }

    /// Returns the position of the element equivalent to `value`, if any.
    pub fn find<Q>(&self, value: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.find(value)
    }

    /// Returns the number of elements equivalent to `value`, which is `0` or `1`.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.count(value)
    }

    /// Returns the position of the first element not less than `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let set = FlatSet::from([10, 20, 30]);
    /// assert_eq!(set.lower_bound(&20), 1);
    /// assert_eq!(set.lower_bound(&25), 2);
    /// assert_eq!(set.upper_bound(&20), 2);
    /// assert_eq!(set.lower_bound(&99), set.len());
    /// ```
    pub fn lower_bound<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.lower_bound(value)
    }

    /// Returns the position of the first element greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.upper_bound(value)
    }

    /// Returns the positions of the elements equivalent to `value`. The range is empty and sits
    /// at the insertion point when there are none.
    pub fn equal_range<Q>(&self, value: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.equal_range(value)
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the set.
    ///
    /// A range whose start lies after its end yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::Included;
    /// use flat_collections::FlatSet;
    ///
    /// let set = FlatSet::from([3, 5, 8]);
    /// for elem in set.range((Included(&4), Included(&8))) {
    ///     println!("{elem}");
    /// }
    /// assert_eq!(Some(&5), set.range(4..).next());
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
        R: RangeBounds<Q>,
    {
        let positions = self.tree.key_range(&range);
        Iter {
            inner: self.as_slice()[positions].iter(),
        }
    }

    /// If the set contains an element equivalent to `value`, removes it and returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.remove_key(value) > 0
    }

    /// Removes and returns the element equivalent to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.take_key(value)
    }
}

impl<T, C: Compare<T>, A: Allocator> FlatSet<T, C, A> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. If an equivalent element is already present,
    /// the set is unchanged and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) comparisons plus O(n) moves.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_unique(value).1
    }

    /// Adds a value to the set and reports where it is.
    ///
    /// Returns the position of the inserted element and `true`, or the position of the existing
    /// equivalent element and `false`.
    pub fn insert_full(&mut self, value: T) -> (usize, bool) {
        self.tree.insert_unique(value)
    }

    /// Adds a value to the set, starting the search at position `hint`, and returns the position
    /// of the element equivalent to `value`.
    ///
    /// The result never depends on the hint. A hint at or next to the final position makes the
    /// search O(1), so inserting ascending input with `hint = len` is linear overall.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let mut set = FlatSet::new();
    /// for value in [1, 2, 4, 8] {
    ///     set.insert_hint(set.len(), value);
    /// }
    /// assert_eq!(set.insert_hint(0, 3), 2);
    /// assert_eq!(set.as_slice(), &[1, 2, 3, 4, 8]);
    /// ```
    pub fn insert_hint(&mut self, hint: usize, value: T) -> usize {
        self.tree.insert_hint_unique(hint, value).0
    }
}

impl<T: Hash, C, A: Allocator> Hash for FlatSet<T, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq, C, A: Allocator> PartialEq for FlatSet<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, C, A: Allocator> Eq for FlatSet<T, C, A> {}

impl<T: PartialOrd, C, A: Allocator> PartialOrd for FlatSet<T, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, C, A: Allocator> Ord for FlatSet<T, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Clone, C: Clone, A: Allocator + Clone> Clone for FlatSet<T, C, A> {
    fn clone(&self) -> Self {
        FlatSet {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for FlatSet<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default, A: Allocator + Default> Default for FlatSet<T, C, A> {
    fn default() -> Self {
        Self::with_comparator_in(C::default(), A::default())
    }
}

impl<T, C: Compare<T> + Default, A: Allocator + Default> FromIterator<T> for FlatSet<T, C, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C: Compare<T>, A: Allocator> Extend<T> for FlatSet<T, C, A> {
    /// Inserts every element from `iter` with a single sort. Elements equivalent to one already
    /// in the set, or to an earlier element of `iter`, are dropped.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend_unique(iter);
    }
}

impl<'a, T: 'a + Copy, C: Compare<T>, A: Allocator> Extend<&'a T> for FlatSet<T, C, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.tree.extend_unique(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for FlatSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T, C, A: Allocator> IntoIterator for FlatSet<T, C, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Gets an iterator for moving out the set's contents in ascending order.
    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter {
            inner: self.tree.into_iter(),
        }
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a FlatSet<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(values: &'a [T]) -> Self {
        Iter {
            inner: values.iter(),
        }
    }

    /// Returns the elements not yet yielded as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [T] {
        self.inner.as_slice()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.inner.as_slice()).finish()
    }
}

impl<T> Default for Iter<'_, T> {
    /// Creates an empty `flat_set::Iter`.
    ///
    /// ```
    /// # use flat_collections::flat_set;
    /// let iter: flat_set::Iter<'_, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter {
            inner: (&[]).iter(),
        }
    }
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(inner: raw::IntoIter<T, A>) -> Self {
        IntoIter {
            inner,
        }
    }

    /// Returns the elements not yet yielded as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Reverse;
    use alloc::string::String;
    use alloc::vec::Vec;
    use static_assertions::assert_impl_all;

    assert_impl_all!(FlatSet<i32>: Send, Sync, Clone, Default, Eq, Ord, Hash);
    assert_impl_all!(Iter<'static, i32>: Send, Sync, Clone, Default, ExactSizeIterator);
    assert_impl_all!(IntoIter<String>: Send, Sync, DoubleEndedIterator);

    #[test]
    fn insert_reports_position_of_existing_element() {
        let mut set = FlatSet::new();
        assert_eq!(set.insert_full(20), (0, true));
        assert_eq!(set.insert_full(10), (0, true));
        assert_eq!(set.insert_full(20), (1, false));
        assert_eq!(set.as_slice(), &[10, 20]);
    }

    #[test]
    fn extend_keeps_existing_and_first_seen() {
        let by_abs = crate::FnCompare(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        let mut set = FlatSet::with_comparator(by_abs);
        set.insert(-3);
        set.extend([3, 1, -1, 2]);
        assert_eq!(set.as_slice(), &[1, 2, -3]);
    }

    #[test]
    fn reverse_comparator_orders_descending() {
        let mut set = FlatSet::with_comparator(Reverse(Natural));
        set.extend([2, 9, 4]);
        assert_eq!(set.first(), Some(&9));
        assert_eq!(set.range(8..=3).copied().collect::<Vec<_>>(), [4]);
        assert_eq!(set.lower_bound(&5), 1);
    }

    #[test]
    fn borrowed_lookups() {
        let mut set: FlatSet<String> = FlatSet::new();
        set.insert(String::from("pear"));
        set.insert(String::from("apple"));
        assert!(set.contains("apple"));
        assert_eq!(set.find("pear"), Some(1));
        assert_eq!(set.take("apple"), Some(String::from("apple")));
        assert!(!set.contains("apple"));
    }

    #[test]
    fn empty_range_when_start_after_end() {
        let set = FlatSet::from([1, 2, 3]);
        #[allow(clippy::reversed_empty_ranges)]
        let empty = set.range(3..1);
        assert_eq!(empty.len(), 0);
    }
}
