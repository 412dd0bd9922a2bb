use super::FlatMap;
use crate::allocator::{Allocator, Global};
use crate::compare::Natural;
use crate::error::Error;
use crate::raw::FlatTree;

impl<K, V> FlatMap<K, V> {
    /// Creates an empty map with capacity for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let map: FlatMap<i32, i32> = FlatMap::with_capacity(16);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<K, V, C> FlatMap<K, V, C> {
    /// Creates an empty map ordered by `cmp` with capacity for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self::with_capacity_and_comparator_in(capacity, cmp, Global)
    }
}

impl<K, V, A: Allocator> FlatMap<K, V, Natural, A> {
    /// Creates an empty map with capacity for at least `capacity` entries, allocated from
    /// `alloc`.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_comparator_in(capacity, Natural, alloc)
    }
}

impl<K, V, C, A: Allocator> FlatMap<K, V, C, A> {
    /// Creates an empty map ordered by `cmp` with capacity for at least `capacity` entries,
    /// allocated from `alloc`.
    #[must_use]
    pub fn with_capacity_and_comparator_in(capacity: usize, cmp: C, alloc: A) -> Self {
        FlatMap {
            tree: FlatTree::with_capacity_in(capacity, cmp, alloc),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the new capacity overflows, or
    /// [`Error::ResourceExhausted`] if the allocator fails. The map is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }

    /// Shrinks the capacity of the map as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }
}
