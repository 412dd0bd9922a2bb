use core::cmp::Ordering::{self, Equal, Greater, Less};
use core::marker::PhantomData;
use core::mem;
use core::ops::{Bound, Range, RangeBounds};

use super::flat_vec::{FlatVec, IntoIter, handle_reserve_error};
use super::key::KeyExtract;
use crate::allocator::Allocator;
use crate::compare::Compare;
use crate::error::Error;

/// The sorted-array engine shared by the flat set, multiset, map and multimap.
///
/// Values live in one contiguous [`FlatVec`] sorted by `X::key(value)` under `C`. The engine
/// offers both unique and multi insertion; each wrapper picks one family and never mixes them, so
/// the store either holds pairwise distinct keys or contiguous runs of equal keys.
///
/// Every insertion stages the new value at the end of the store and then rotates it into place,
/// so the only reallocation an insert can cause is the one the staging push causes.
pub(crate) struct FlatTree<V, X, C, A: Allocator> {
    store: FlatVec<V, A>,
    cmp: C,
    _key: PhantomData<fn() -> X>,
}

/// Truncates `store` back to `len` when dropped, unless [`commit`](Self::commit)ted first.
///
/// Held across calls into the caller's iterator and comparator, so a panic from either leaves the
/// store holding only values that are already in order.
struct Rollback<'a, V, A: Allocator> {
    store: &'a mut FlatVec<V, A>,
    len: usize,
}

impl<'a, V, A: Allocator> Rollback<'a, V, A> {
    fn new(store: &'a mut FlatVec<V, A>, len: usize) -> Self {
        Self { store, len }
    }

    fn commit(self) {
        mem::forget(self);
    }
}

impl<V, A: Allocator> Drop for Rollback<'_, V, A> {
    fn drop(&mut self) {
        self.store.truncate(self.len);
    }
}

/// Returns the partition point of `items` under `pred`, searching outward from `hint`.
///
/// `pred` must be `true` for a prefix of `items` and `false` for the rest. The probe distance
/// doubles on each step, so the cost is O(log d) comparisons where `d` is the distance between
/// `hint` and the answer.
fn gallop<T, P>(items: &[T], hint: usize, mut pred: P) -> usize
where
    P: FnMut(&T) -> bool,
{
    debug_assert!(hint <= items.len());
    let len = items.len();

    if hint < len && pred(&items[hint]) {
        // The partition point lies strictly right of the hint.
        let mut lo = hint + 1;
        let mut step = 1;
        let hi = loop {
            let probe = hint + step;
            if probe >= len {
                break len;
            }
            if !pred(&items[probe]) {
                break probe;
            }
            lo = probe + 1;
            step *= 2;
        };
        lo + items[lo..hi].partition_point(&mut pred)
    } else {
        // The partition point is at or left of the hint.
        let mut hi = hint;
        let mut step = 1;
        let lo = loop {
            if step > hint {
                break 0;
            }
            let probe = hint - step;
            if pred(&items[probe]) {
                break probe + 1;
            }
            hi = probe;
            step *= 2;
        };
        lo + items[lo..hi].partition_point(&mut pred)
    }
}

impl<V, X, C, A> FlatTree<V, X, C, A>
where
    X: KeyExtract<V>,
    A: Allocator,
{
    pub(crate) const fn new_in(cmp: C, alloc: A) -> Self {
        Self {
            store: FlatVec::new_in(alloc),
            cmp,
            _key: PhantomData,
        }
    }

    pub(crate) fn try_with_capacity_in(capacity: usize, cmp: C, alloc: A) -> Result<Self, Error> {
        Ok(Self {
            store: FlatVec::try_with_capacity_in(capacity, alloc)?,
            cmp,
            _key: PhantomData,
        })
    }

    pub(crate) fn with_capacity_in(capacity: usize, cmp: C, alloc: A) -> Self {
        match Self::try_with_capacity_in(capacity, cmp, alloc) {
            Ok(tree) => tree,
            Err(error) => handle_reserve_error::<V>(error, capacity),
        }
    }

    /// Clones every value, in order, into a new store allocated from `alloc`.
    pub(crate) fn clone_in<B: Allocator>(&self, alloc: B) -> FlatTree<V, X, C, B>
    where
        V: Clone,
        C: Clone,
    {
        let mut copy = FlatTree::with_capacity_in(self.len(), self.cmp.clone(), alloc);
        for value in self.as_slice() {
            copy.store.push(value.clone());
        }
        copy
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.store.capacity()
    }

    #[inline]
    pub(crate) const fn allocator(&self) -> &A {
        self.store.allocator()
    }

    #[inline]
    pub(crate) const fn comparator(&self) -> &C {
        &self.cmp
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[V] {
        self.store.as_slice()
    }

    /// Mutable view of the sorted values.
    ///
    /// Callers may only mutate the parts of a value that `X` does not project onto.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [V] {
        self.store.as_mut_slice()
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.store.try_reserve(additional)
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.store.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.store.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
    }

    /// Removes and returns the value at `index`. Positions after `index` shift left by one.
    pub(crate) fn remove_index(&mut self, index: usize) -> V {
        self.store.remove(index)
    }

    /// Removes the values in `range` and returns the position that now holds the value that
    /// followed it.
    pub(crate) fn remove_range(&mut self, range: Range<usize>) -> usize {
        self.store.remove_range(range.start, range.end);
        range.start
    }

    pub(crate) fn pop_first(&mut self) -> Option<V> {
        if self.is_empty() { None } else { Some(self.store.remove(0)) }
    }

    pub(crate) fn pop_last(&mut self) -> Option<V> {
        self.store.pop()
    }

    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&mut V) -> bool,
    {
        self.store.retain_mut(keep);
    }

    pub(crate) fn into_iter(self) -> IntoIter<V, A> {
        self.store.into_iter()
    }

    /// Moves the value staged at the end of the store to `position`.
    fn settle(&mut self, position: usize) -> usize {
        self.store.as_mut_slice()[position..].rotate_right(1);
        position
    }

    #[inline]
    fn assert_hint(&self, hint: usize) {
        assert!(hint <= self.len(), "`FlatTree::insert_hint()` - `hint` ({hint}) > `len` ({})!", self.len());
    }

    /// Inserts `value` at `position`, which the caller has already located with a search on the
    /// value's key.
    pub(crate) fn insert_at(&mut self, position: usize, value: V) -> usize {
        debug_assert!(position <= self.len());
        self.store.push(value);
        self.settle(position)
    }

    /// [`lower_bound`](Self::lower_bound), searching outward from `hint`.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub(crate) fn lower_bound_hint<Q>(&self, hint: usize, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.assert_hint(hint);
        gallop(self.as_slice(), hint, |value| self.cmp.compare(X::key(value), key) == Less)
    }

    /// Returns `true` if the value at `position` exists and its key is equivalent to `key`.
    pub(crate) fn matches_at<Q>(&self, position: usize, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.as_slice().get(position).is_some_and(|value| self.cmp.compare(X::key(value), key) == Equal)
    }

    /// Returns the first position whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.as_slice().partition_point(|value| self.cmp.compare(X::key(value), key) == Less)
    }

    /// Returns the first position whose key is greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.as_slice().partition_point(|value| self.cmp.compare(X::key(value), key) != Greater)
    }

    /// Returns the positions of the run of values whose key is equivalent to `key`.
    pub(crate) fn equal_range<Q>(&self, key: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        let lower = self.lower_bound(key);
        let upper = lower + self.as_slice()[lower..].partition_point(|value| self.cmp.compare(X::key(value), key) != Greater);
        lower..upper
    }

    /// Returns the positions of the values whose keys fall within `range`.
    ///
    /// A range whose start lies after its end selects nothing.
    pub(crate) fn key_range<Q, R>(&self, range: &R) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
        R: RangeBounds<Q>,
    {
        let start = match range.start_bound() {
            Bound::Included(key) => self.lower_bound(key),
            Bound::Excluded(key) => self.upper_bound(key),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(key) => self.upper_bound(key),
            Bound::Excluded(key) => self.lower_bound(key),
            Bound::Unbounded => self.len(),
        };
        start..end.max(start)
    }

    /// Returns the position of the first value whose key is equivalent to `key`.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        let lower = self.lower_bound(key);
        self.matches_at(lower, key).then_some(lower)
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.find(key).map(|index| &self.as_slice()[index])
    }

    pub(crate) fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.equal_range(key).len()
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        self.find(key).is_some()
    }

    /// Removes every value whose key is equivalent to `key` and returns how many were removed.
    pub(crate) fn remove_key<Q>(&mut self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        let range = self.equal_range(key);
        let count = range.len();
        if count > 0 {
            self.store.remove_range(range.start, range.end);
        }
        count
    }

    /// Removes and returns the first value whose key is equivalent to `key`.
    pub(crate) fn take_key<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: Compare<X::Key, Q>,
    {
        let index = self.find(key)?;
        Some(self.store.remove(index))
    }
}

impl<V, X, C, A> FlatTree<V, X, C, A>
where
    X: KeyExtract<V>,
    C: Compare<X::Key>,
    A: Allocator,
{
    /// Compares two stored values by their keys.
    #[inline]
    fn order(cmp: &C, lhs: &V, rhs: &V) -> Ordering {
        cmp.compare(X::key(lhs), X::key(rhs))
    }

    /// Stages `value` at the end of the store and runs `locate` on the settled prefix and the
    /// staged value. If `locate` panics the staged value is dropped again.
    fn stage<F, T>(&mut self, value: V, locate: F) -> T
    where
        F: FnOnce(&C, &[V], &V) -> T,
    {
        let len = self.len();
        self.store.push(value);
        let rollback = Rollback::new(&mut self.store, len);
        let (settled, staged) = rollback.store.as_slice().split_at(len);
        let found = locate(&self.cmp, settled, &staged[0]);
        rollback.commit();
        found
    }

    /// Resolves a staged unique insert whose lower bound is `lower`.
    fn finish_unique(&mut self, lower: usize, duplicate: bool) -> (usize, bool) {
        if duplicate {
            drop(self.store.pop());
            (lower, false)
        } else {
            (self.settle(lower), true)
        }
    }

    /// Returns `true` if `settled[lower]` is equivalent to `staged`.
    fn is_duplicate(cmp: &C, settled: &[V], lower: usize, staged: &V) -> bool {
        settled.get(lower).is_some_and(|existing| Self::order(cmp, existing, staged) == Equal)
    }

    /// Inserts `value` unless an equivalent key is present.
    ///
    /// Returns the position of the inserted value and `true`, or the position of the existing
    /// value and `false`, in which case `value` is dropped.
    pub(crate) fn insert_unique(&mut self, value: V) -> (usize, bool) {
        let (lower, duplicate) = self.stage(value, |cmp, settled, staged| {
            let lower = settled.partition_point(|existing| Self::order(cmp, existing, staged) == Less);
            (lower, Self::is_duplicate(cmp, settled, lower, staged))
        });
        self.finish_unique(lower, duplicate)
    }

    /// Inserts `value` after every value with an equivalent key and returns its position.
    pub(crate) fn insert_multi(&mut self, value: V) -> usize {
        let upper = self.stage(value, |cmp, settled, staged| {
            settled.partition_point(|existing| Self::order(cmp, existing, staged) != Greater)
        });
        self.settle(upper)
    }

    /// [`insert_unique`](Self::insert_unique), searching outward from `hint`.
    ///
    /// The hint only changes how many comparisons are made, never the result.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub(crate) fn insert_hint_unique(&mut self, hint: usize, value: V) -> (usize, bool) {
        self.assert_hint(hint);
        let (lower, duplicate) = self.stage(value, |cmp, settled, staged| {
            let lower = gallop(settled, hint, |existing| Self::order(cmp, existing, staged) == Less);
            (lower, Self::is_duplicate(cmp, settled, lower, staged))
        });
        self.finish_unique(lower, duplicate)
    }

    /// [`insert_multi`](Self::insert_multi), searching outward from `hint`.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub(crate) fn insert_hint_multi(&mut self, hint: usize, value: V) -> usize {
        self.assert_hint(hint);
        let upper = self.stage(value, |cmp, settled, staged| {
            gallop(settled, hint, |existing| Self::order(cmp, existing, staged) != Greater)
        });
        self.settle(upper)
    }

    /// Appends every value from `values`, then restores order with stable sorts.
    ///
    /// The sorts are stable, so existing values stay ahead of new values with equivalent keys, and
    /// new values keep their input order among themselves.
    ///
    /// A panic from `values` or from the new values' own sort drops every new value. A panic while
    /// the two sorted runs are merged empties the store.
    fn append_sorted<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
    {
        let values = values.into_iter();
        let old_len = self.len();
        self.reserve(values.size_hint().0);

        let mut rollback = Rollback::new(&mut self.store, old_len);
        for value in values {
            rollback.store.push(value);
        }
        if rollback.store.len() == old_len {
            rollback.commit();
            return false;
        }
        let cmp = &self.cmp;
        rollback.store.as_mut_slice()[old_len..].sort_by(|a, b| Self::order(cmp, a, b));
        rollback.commit();

        if old_len > 0 {
            let mut rollback = Rollback::new(&mut self.store, 0);
            rollback.store.as_mut_slice().sort_by(|a, b| Self::order(cmp, a, b));
            rollback.commit();
        }
        true
    }

    /// Bulk unique insertion. Values whose key is already present, or repeated within `values`,
    /// are dropped; the first occurrence wins.
    pub(crate) fn extend_unique<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        if self.append_sorted(values) {
            let cmp = &self.cmp;
            self.store.dedup_by(|later, earlier| Self::order(cmp, later, earlier) == Equal);
        }
    }

    /// Bulk multi insertion. Each new value lands after every earlier value with an equivalent
    /// key.
    pub(crate) fn extend_multi<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.append_sorted(values);
    }
}

impl<V: Clone, X, C: Clone, A: Allocator + Clone> Clone for FlatTree<V, X, C, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cmp: self.cmp.clone(),
            _key: PhantomData,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use crate::allocator::Global;
    use crate::compare::{FnCompare, Natural};
    use crate::raw::key::{First, Identity};
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    type Set = FlatTree<i32, Identity, Natural, Global>;
    type Map = FlatTree<(i32, u32), First, Natural, Global>;

    impl<V, X, C, A> FlatTree<V, X, C, A>
    where
        X: KeyExtract<V>,
        C: Compare<X::Key>,
        A: Allocator,
    {
        /// Panics if the store is not sorted, or if `unique` and two keys are equivalent.
        pub(crate) fn validate_invariants(&self, unique: bool) {
            assert!(self.capacity() >= self.len(), "capacity below len");
            for (index, pair) in self.as_slice().windows(2).enumerate() {
                match Self::order(&self.cmp, &pair[0], &pair[1]) {
                    Less => {}
                    Equal => assert!(!unique, "duplicate keys at positions {} and {}", index, index + 1),
                    Greater => panic!("store not sorted at positions {} and {}", index, index + 1),
                }
            }
        }
    }

    #[test]
    fn gallop_finds_partition_from_any_hint() {
        let items: Vec<i32> = (0..50).collect();
        for target in 0..=50 {
            for hint in 0..=50 {
                assert_eq!(gallop(&items, hint, |v| *v < target), target as usize, "hint {hint}");
            }
        }
        assert_eq!(gallop::<i32, _>(&[], 0, |_| true), 0);
    }

    #[test]
    fn unique_insert_rejects_duplicates() {
        let mut tree = Set::new_in(Natural, Global);
        assert_eq!(tree.insert_unique(5), (0, true));
        assert_eq!(tree.insert_unique(1), (0, true));
        assert_eq!(tree.insert_unique(3), (1, true));
        assert_eq!(tree.insert_unique(3), (1, false));
        assert_eq!(tree.as_slice(), &[1, 3, 5]);
        tree.validate_invariants(true);
    }

    #[test]
    fn multi_insert_appends_to_run() {
        let by_key = FnCompare(|a: &(u8, u8), b: &(u8, u8)| a.0.cmp(&b.0));
        let mut tree: FlatTree<(u8, u8), Identity, _, Global> = FlatTree::new_in(by_key, Global);
        assert_eq!(tree.insert_multi((1, 0)), 0);
        assert_eq!(tree.insert_multi((0, 0)), 0);
        assert_eq!(tree.insert_multi((1, 1)), 2);
        assert_eq!(tree.insert_hint_multi(0, (1, 2)), 3);
        assert_eq!(tree.insert_hint_multi(1, (0, 1)), 1);
        assert_eq!(tree.as_slice(), &[(0, 0), (0, 1), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(tree.equal_range(&(1, 9)), 2..5);
    }

    #[test]
    fn hinted_duplicate_reports_existing_position() {
        let mut tree = Set::new_in(Natural, Global);
        tree.extend_unique([10, 20, 30, 40]);
        for hint in 0..=4 {
            assert_eq!(tree.insert_hint_unique(hint, 30), (2, false));
            assert_eq!(tree.insert_hint_unique(hint, 10), (0, false));
        }
        assert_eq!(tree.len(), 4);
    }

    #[test]
    #[should_panic(expected = "`FlatTree::insert_hint()` - `hint` (3) > `len` (2)!")]
    fn hint_past_end_panics() {
        let mut tree = Set::new_in(Natural, Global);
        tree.extend_unique([1, 2]);
        tree.insert_hint_unique(3, 0);
    }

    #[test]
    fn extend_unique_keeps_existing_and_first_seen() {
        let mut tree = Map::new_in(Natural, Global);
        tree.insert_unique((2, 0));
        tree.extend_unique([(3, 1), (2, 1), (1, 1), (3, 2)]);
        assert_eq!(tree.as_slice(), &[(1, 1), (2, 0), (3, 1)]);
    }

    #[test]
    fn remove_key_removes_whole_run() {
        let mut tree = Set::new_in(Natural, Global);
        tree.extend_multi([3, 1, 3, 2, 3]);
        assert_eq!(tree.remove_key(&3), 3);
        assert_eq!(tree.remove_key(&3), 0);
        assert_eq!(tree.as_slice(), &[1, 2]);
    }

    /// Orders like [`Natural`] but refuses to compare 99.
    fn touchy(a: &i32, b: &i32) -> core::cmp::Ordering {
        assert!(*a != 99 && *b != 99, "99 is unorderable");
        a.cmp(b)
    }

    type Touchy = FlatTree<i32, Identity, FnCompare<fn(&i32, &i32) -> core::cmp::Ordering>, Global>;

    #[test]
    fn panicking_source_leaves_the_store_sorted() {
        let mut tree = Set::new_in(Natural, Global);
        tree.extend_unique([10, 20, 30]);
        let failed = catch_unwind(AssertUnwindSafe(|| {
            tree.extend_unique([5, 1, 20].into_iter().chain(core::iter::from_fn(|| -> Option<i32> { panic!("source failed") })));
        }));
        assert!(failed.is_err());
        tree.validate_invariants(true);
        assert_eq!(tree.as_slice(), &[10, 20, 30]);
        assert_eq!(tree.count(&20), 1);

        let mut map = Map::new_in(Natural, Global);
        map.insert_unique((3, 0));
        let failed = catch_unwind(AssertUnwindSafe(|| {
            map.extend_multi([(1, 1)].into_iter().chain(core::iter::from_fn(|| -> Option<(i32, u32)> { panic!("source failed") })));
        }));
        assert!(failed.is_err());
        map.validate_invariants(true);
        assert_eq!(map.get(&3), Some(&(3, 0)));
        assert_eq!(map.get(&1), None);
    }

    #[test]
    fn panicking_comparator_leaves_the_store_sorted() {
        let mut tree = Touchy::new_in(FnCompare(touchy as fn(&i32, &i32) -> core::cmp::Ordering), Global);
        tree.extend_multi([3, 1, 2]);

        assert!(catch_unwind(AssertUnwindSafe(|| tree.insert_unique(99))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| tree.insert_multi(99))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| tree.insert_hint_unique(3, 99))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| tree.insert_hint_multi(0, 99))).is_err());
        assert!(catch_unwind(AssertUnwindSafe(|| tree.extend_unique([4, 99, 0]))).is_err());
        tree.validate_invariants(true);
        assert_eq!(tree.as_slice(), &[1, 2, 3]);

        assert_eq!(tree.insert_unique(0), (0, true));
        assert_eq!(tree.as_slice(), &[0, 1, 2, 3]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        InsertHint(usize, i32),
        Remove(i32),
        RemoveIndex(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i32..200).prop_map(Op::Insert),
            4 => (any::<usize>(), 0i32..200).prop_map(|(hint, key)| Op::InsertHint(hint, key)),
            2 => (0i32..200).prop_map(Op::Remove),
            1 => any::<usize>().prop_map(Op::RemoveIndex),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn unique_invariants_maintained(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = Set::new_in(Natural, Global);
            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let (index, _) = tree.insert_unique(key);
                        prop_assert_eq!(tree.as_slice()[index], key);
                    }
                    Op::InsertHint(hint, key) => {
                        let hint = hint % (tree.len() + 1);
                        let (index, _) = tree.insert_hint_unique(hint, key);
                        prop_assert_eq!(tree.as_slice()[index], key);
                    }
                    Op::Remove(key) => {
                        prop_assert!(tree.remove_key(&key) <= 1);
                    }
                    Op::RemoveIndex(which) => {
                        if !tree.is_empty() {
                            let index = which % tree.len();
                            tree.remove_index(index);
                        }
                    }
                }
                tree.validate_invariants(true);
            }
        }

        #[test]
        fn multi_runs_stay_contiguous(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = Map::new_in(Natural, Global);
            for (serial, op) in ops.into_iter().enumerate() {
                let serial = serial as u32;
                match op {
                    Op::Insert(key) => {
                        let index = tree.insert_multi((key, serial));
                        prop_assert_eq!(tree.as_slice()[index], (key, serial));
                        prop_assert_eq!(index + 1, tree.upper_bound(&key));
                    }
                    Op::InsertHint(hint, key) => {
                        let hint = hint % (tree.len() + 1);
                        let index = tree.insert_hint_multi(hint, (key, serial));
                        prop_assert_eq!(index + 1, tree.upper_bound(&key));
                    }
                    Op::Remove(key) => {
                        let expected = tree.count(&key);
                        prop_assert_eq!(tree.remove_key(&key), expected);
                    }
                    Op::RemoveIndex(which) => {
                        if !tree.is_empty() {
                            let index = which % tree.len();
                            tree.remove_index(index);
                        }
                    }
                }
                tree.validate_invariants(false);
                // Within a run, serial numbers record insertion order.
                for pair in tree.as_slice().windows(2) {
                    if pair[0].0 == pair[1].0 {
                        prop_assert!(pair[0].1 < pair[1].1);
                    }
                }
            }
        }

        #[test]
        fn hint_never_changes_the_outcome(
            keys in prop::collection::vec(0i32..100, 0..100),
            key in 0i32..100,
            hint in any::<usize>(),
        ) {
            let mut base = Set::new_in(Natural, Global);
            base.extend_multi(keys);

            let mut plain = base.clone();
            let expected = plain.insert_multi(key);
            let mut hinted = base.clone();
            let actual = hinted.insert_hint_multi(hint % (base.len() + 1), key);
            prop_assert_eq!(expected, actual);
            prop_assert_eq!(plain.as_slice(), hinted.as_slice());

            let mut unique = Set::new_in(Natural, Global);
            unique.extend_unique(base.as_slice().iter().copied());
            let mut plain = unique.clone();
            let mut hinted = unique.clone();
            let expected = plain.insert_unique(key);
            let actual = hinted.insert_hint_unique(hint % (unique.len() + 1), key);
            prop_assert_eq!(expected, actual);
            prop_assert_eq!(plain.as_slice(), hinted.as_slice());
        }
    }
}
