use super::FlatSet;
use crate::allocator::{Allocator, Global};
use crate::compare::Natural;
use crate::error::Error;
use crate::raw::FlatTree;

impl<T> FlatSet<T> {
    /// Creates an empty set with capacity for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatSet;
    ///
    /// let set: FlatSet<i32> = FlatSet::with_capacity(16);
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, C> FlatSet<T, C> {
    /// Creates an empty set ordered by `cmp` with capacity for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self::with_capacity_and_comparator_in(capacity, cmp, Global)
    }
}

impl<T, A: Allocator> FlatSet<T, Natural, A> {
    /// Creates an empty set with capacity for at least `capacity` elements, allocated from
    /// `alloc`.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_comparator_in(capacity, Natural, alloc)
    }
}

impl<T, C, A: Allocator> FlatSet<T, C, A> {
    /// Creates an empty set ordered by `cmp` with capacity for at least `capacity` elements,
    /// allocated from `alloc`.
    #[must_use]
    pub fn with_capacity_and_comparator_in(capacity: usize, cmp: C, alloc: A) -> Self {
        FlatSet {
            tree: FlatTree::with_capacity_in(capacity, cmp, alloc),
        }
    }

    /// Returns the number of elements the set can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`; aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the allocator fails.
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the new capacity overflows, or
    /// [`Error::ResourceExhausted`] if the allocator fails. The set is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::{Error, FlatSet};
    ///
    /// let mut set: FlatSet<u64> = FlatSet::new();
    /// assert_eq!(set.try_reserve(10), Ok(()));
    /// assert_eq!(set.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }

    /// Shrinks the capacity of the set as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }
}
