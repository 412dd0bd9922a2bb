use super::FlatMultiMap;
use crate::allocator::{Allocator, Global};
use crate::compare::Natural;
use crate::error::Error;
use crate::raw::FlatTree;

impl<K, V> FlatMultiMap<K, V> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<K, V, C> FlatMultiMap<K, V, C> {
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self::with_capacity_and_comparator_in(capacity, cmp, Global)
    }
}

impl<K, V, A: Allocator> FlatMultiMap<K, V, Natural, A> {
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_comparator_in(capacity, Natural, alloc)
    }
}

impl<K, V, C, A: Allocator> FlatMultiMap<K, V, C, A> {
    /// Creates an empty multimap ordered by `cmp` with capacity for at least `capacity` entries,
    /// allocated from `alloc`.
    #[must_use]
    pub fn with_capacity_and_comparator_in(capacity: usize, cmp: C, alloc: A) -> Self {
        FlatMultiMap {
            tree: FlatTree::with_capacity_in(capacity, cmp, alloc),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::ResourceExhausted`]; the multimap is
    /// unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }
}
