use super::FlatMultiSet;
use crate::allocator::{Allocator, Global};
use crate::compare::Natural;
use crate::error::Error;
use crate::raw::FlatTree;

impl<T> FlatMultiSet<T> {
    /// Creates an empty multiset with capacity for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, C> FlatMultiSet<T, C> {
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self::with_capacity_and_comparator_in(capacity, cmp, Global)
    }
}

impl<T, A: Allocator> FlatMultiSet<T, Natural, A> {
    /// Creates an empty multiset with capacity for at least `capacity` elements, allocated from
    /// `alloc`.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::with_capacity_and_comparator_in(capacity, Natural, alloc)
    }
}

impl<T, C, A: Allocator> FlatMultiSet<T, C, A> {
    /// Creates an empty multiset ordered by `cmp` with capacity for at least `capacity`
    /// elements, allocated from `alloc`.
    #[must_use]
    pub fn with_capacity_and_comparator_in(capacity: usize, cmp: C, alloc: A) -> Self {
        FlatMultiSet {
            tree: FlatTree::with_capacity_in(capacity, cmp, alloc),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::ResourceExhausted`]; the multiset is
    /// unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }
}
