use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Range, RangeBounds};

use crate::allocator::{Allocator, Global};
use crate::compare::{Compare, Natural};
use crate::raw::{self, FlatTree, Identity};

mod capacity;

pub use crate::flat_set::{IntoIter, Iter};

/// An ordered multiset stored as a single sorted array.
///
/// Like [`FlatSet`](crate::FlatSet), but equivalent elements may repeat. Equivalent elements form
/// one contiguous run, kept in the order they were inserted: a new element always lands after
/// every element already equivalent to it.
///
/// # Examples
///
/// ```
/// use flat_collections::{FlatMultiSet, FnCompare};
///
/// // Order tasks by priority only, so tasks with equal priority keep their arrival order.
/// let by_priority = FnCompare(|a: &(u8, &str), b: &(u8, &str)| a.0.cmp(&b.0));
/// let mut tasks = FlatMultiSet::with_comparator(by_priority);
/// tasks.insert((2, "write report"));
/// tasks.insert((1, "fix build"));
/// tasks.insert((2, "review patch"));
///
/// assert_eq!(
///     tasks.as_slice(),
///     &[(1, "fix build"), (2, "write report"), (2, "review patch")]
/// );
/// assert_eq!(tasks.count(&(2, "")), 2);
/// ```
pub struct FlatMultiSet<T, C = Natural, A: Allocator = Global> {
    tree: FlatTree<T, Identity, C, A>,
}

impl<T> FlatMultiSet<T> {
    /// Makes a new, empty `FlatMultiSet` ordered by [`Ord`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator_in(Natural, Global)
    }
}

impl<T, C> FlatMultiSet<T, C> {
    /// Makes a new, empty `FlatMultiSet` ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_in(cmp, Global)
    }

    /// Builds a multiset ordered by `cmp` from `iter`, keeping equivalent elements in input
    /// order.
    pub fn from_iter_with<I>(iter: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = T>,
        C: Compare<T>,
    {
        Self::from_iter_with_in(iter, cmp, Global)
    }
}

impl<T, A: Allocator> FlatMultiSet<T, Natural, A> {
    /// Makes a new, empty `FlatMultiSet` ordered by [`Ord`] that allocates from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self::with_comparator_in(Natural, alloc)
    }
}

impl<T, C, A: Allocator> FlatMultiSet<T, C, A> {
    /// Makes a new, empty `FlatMultiSet` ordered by `cmp` that allocates from `alloc`.
    #[must_use]
    pub const fn with_comparator_in(cmp: C, alloc: A) -> Self {
        FlatMultiSet {
            tree: FlatTree::new_in(cmp, alloc),
        }
    }

    /// Builds a multiset ordered by `cmp` from `iter`, allocated from `alloc`. Equivalent elements keep their input order.
    pub fn from_iter_with_in<I>(iter: I, cmp: C, alloc: A) -> Self
    where
        I: IntoIterator<Item = T>,
        C: Compare<T>,
    {
        let mut set = Self::with_comparator_in(cmp, alloc);
        set.tree.extend_multi(iter);
        set
    }

    /// Clones the multiset into a new one that allocates from `alloc`.
    #[must_use]
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> FlatMultiSet<T, C, B>
    where
        T: Clone,
        C: Clone,
    {
        FlatMultiSet {
            tree: self.tree.clone_in(alloc),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    #[must_use]
    pub const fn allocator(&self) -> &A {
        self.tree.allocator()
    }

    /// Returns the elements as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.tree.as_slice()
    }

    /// Gets an iterator that visits the elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }

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
    pub fn remove_range<R>(&mut self, range: R) -> usize
    where
        R: RangeBounds<usize>,
    {
        let range = raw::index_range(&range, self.len());
        self.tree.remove_range(range)
    }

    /// Retains only the elements specified by the predicate.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.tree.retain(|value| keep(value));
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.contains(value)
    }

    /// Returns the first element equivalent to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.get(value)
    }

    /// Returns the position of the first element equivalent to `value`, if any.
    pub fn find<Q>(&self, value: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.find(value)
    }

    /// Returns the number of elements equivalent to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.count(value)
    }

    pub fn lower_bound<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.lower_bound(value)
    }

    pub fn upper_bound<Q>(&self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.upper_bound(value)
    }

    /// Returns the positions of the run of elements equivalent to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMultiSet;
    ///
    /// let set: FlatMultiSet<i32> = [5, 1, 5, 3, 5].into_iter().collect();
    /// assert_eq!(set.equal_range(&5), 2..5);
    /// assert_eq!(set.equal_range(&4), 2..2);
    /// ```
    pub fn equal_range<Q>(&self, value: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.equal_range(value)
    }

    /// Constructs a double-ended iterator over the elements whose keys fall within `range`.
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
        R: RangeBounds<Q>,
    {
        let positions = self.tree.key_range(&range);
        Iter::new(&self.as_slice()[positions])
    }

    /// Removes every element equivalent to `value` and returns how many were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMultiSet;
    ///
    /// let mut set = FlatMultiSet::from([1, 2, 2, 3]);
    /// assert_eq!(set.remove(&2), 2);
    /// assert_eq!(set.remove(&2), 0);
    /// assert_eq!(set.as_slice(), &[1, 3]);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.remove_key(value)
    }

    /// Removes and returns the first element equivalent to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        Q: ?Sized,
        C: Compare<T, Q>,
    {
        self.tree.take_key(value)
    }
}

impl<T, C: Compare<T>, A: Allocator> FlatMultiSet<T, C, A> {
    /// Adds a value after every element equivalent to it and returns its position.
    pub fn insert(&mut self, value: T) -> usize {
        self.tree.insert_multi(value)
    }

    /// Adds a value after every element equivalent to it, starting the search at position
    /// `hint`, and returns its position.
    ///
    /// The result never depends on the hint.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub fn insert_hint(&mut self, hint: usize, value: T) -> usize {
        self.tree.insert_hint_multi(hint, value)
    }
}

impl<T: Hash, C, A: Allocator> Hash for FlatMultiSet<T, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq, C, A: Allocator> PartialEq for FlatMultiSet<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, C, A: Allocator> Eq for FlatMultiSet<T, C, A> {}

impl<T: PartialOrd, C, A: Allocator> PartialOrd for FlatMultiSet<T, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, C, A: Allocator> Ord for FlatMultiSet<T, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Clone, C: Clone, A: Allocator + Clone> Clone for FlatMultiSet<T, C, A> {
    fn clone(&self) -> Self {
        FlatMultiSet {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for FlatMultiSet<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, C: Default, A: Allocator + Default> Default for FlatMultiSet<T, C, A> {
    fn default() -> Self {
        Self::with_comparator_in(C::default(), A::default())
    }
}

impl<T, C: Compare<T> + Default, A: Allocator + Default> FromIterator<T> for FlatMultiSet<T, C, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C: Compare<T>, A: Allocator> Extend<T> for FlatMultiSet<T, C, A> {
    /// Inserts every element from `iter` with a single stable sort, so each new element lands
    /// after the elements already equivalent to it.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend_multi(iter);
    }
}

impl<'a, T: 'a + Copy, C: Compare<T>, A: Allocator> Extend<&'a T> for FlatMultiSet<T, C, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.tree.extend_multi(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for FlatMultiSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T, C, A: Allocator> IntoIterator for FlatMultiSet<T, C, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter::new(self.tree.into_iter())
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a FlatMultiSet<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
