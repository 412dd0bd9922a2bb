use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Range, RangeBounds};

use crate::allocator::{Allocator, Global};
use crate::compare::{Compare, Natural};
use crate::raw::{self, First, FlatTree};

mod access;
mod capacity;
mod iter;

pub use iter::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut};

/// An ordered map stored as a single sorted array of `(key, value)` entries.
///
/// Entries live contiguously in ascending key order under the comparator `C`, so
/// [`as_slice`](Self::as_slice) hands out the storage itself and iteration is a slice walk.
/// Lookups are binary searches. Inserting or removing shifts the entries after the affected
/// position; bulk loading through [`Extend`] or [`FromIterator`] sorts once instead.
///
/// Keys are unique. [`insert`](Self::insert) never overwrites: it reports where the existing
/// entry is and drops the offered pair. Use [`insert_or_assign`](Self::insert_or_assign) to
/// overwrite, or [`try_emplace`](Self::try_emplace) to build the value only when the key is new.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by `C`, changes while it is in the map. The behavior resulting from
/// such a logic error is not specified, but will be encapsulated to the `FlatMap` that observed
/// it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use flat_collections::FlatMap;
///
/// let mut movie_reviews = FlatMap::new();
///
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.", movie_reviews.len());
/// }
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// movie_reviews.remove("The Blues Brothers");
///
/// for movie in ["Up!", "Office Space"] {
///     match movie_reviews.get(movie) {
///         Some(review) => println!("{movie}: {review}"),
///         None => println!("{movie} is unreviewed."),
///     }
/// }
///
/// // Look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews["Office Space"]);
///
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A `FlatMap` with a known list of items can be initialized from an array:
///
/// ```
/// use flat_collections::FlatMap;
///
/// let solar_distance = FlatMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.keys().next(), Some(&"Earth"));
/// ```
pub struct FlatMap<K, V, C = Natural, A: Allocator = Global> {
    tree: FlatTree<(K, V), First, C, A>,
}

impl<K, V> FlatMap<K, V> {
    /// Makes a new, empty `FlatMap` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator_in(Natural, Global)
    }
}

impl<K, V, C> FlatMap<K, V, C> {
    /// Makes a new, empty `FlatMap` ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_in(cmp, Global)
    }

    /// Builds a map ordered by `cmp` from `iter`. When a key repeats, the first entry wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::{FlatMap, Natural, Reverse};
    ///
    /// let map = FlatMap::from_iter_with([(1, 'a'), (2, 'b'), (1, 'c')], Reverse(Natural));
    /// assert_eq!(map.as_slice(), &[(2, 'b'), (1, 'a')]);
    /// ```
    pub fn from_iter_with<I>(iter: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        C: Compare<K>,
    {
        Self::from_iter_with_in(iter, cmp, Global)
    }
}

impl<K, V, A: Allocator> FlatMap<K, V, Natural, A> {
    /// Makes a new, empty `FlatMap` ordered by [`Ord`] that allocates from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self::with_comparator_in(Natural, alloc)
    }
}

impl<K, V, C, A: Allocator> FlatMap<K, V, C, A> {
    /// Makes a new, empty `FlatMap` ordered by `cmp` that allocates from `alloc`.
    #[must_use]
    pub const fn with_comparator_in(cmp: C, alloc: A) -> Self {
        FlatMap {
            tree: FlatTree::new_in(cmp, alloc),
        }
    }

    /// Builds a map ordered by `cmp` from `iter`, allocated from `alloc`. When a key repeats, the first entry wins.
    pub fn from_iter_with_in<I>(iter: I, cmp: C, alloc: A) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        C: Compare<K>,
    {
        let mut map = Self::with_comparator_in(cmp, alloc);
        map.tree.extend_unique(iter);
        map
    }

    /// Clones the map into a new one that allocates from `alloc`.
    #[must_use]
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> FlatMap<K, V, C, B>
    where
        K: Clone,
        V: Clone,
        C: Clone,
    {
        FlatMap {
            tree: self.tree.clone_in(alloc),
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
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

    /// Returns the entries as a slice sorted by key.
    #[must_use]
    pub fn as_slice(&self) -> &[(K, V)] {
        self.tree.as_slice()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.as_slice())
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.tree.as_mut_slice())
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.as_slice())
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.as_slice())
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut a = FlatMap::new();
    /// a.insert(1, String::from("hello"));
    /// a.insert(2, String::from("goodbye"));
    ///
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    ///
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"), String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.tree.as_mut_slice())
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    pub fn into_keys(self) -> IntoKeys<K, V, A> {
        IntoKeys::new(self.tree.into_iter())
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    pub fn into_values(self) -> IntoValues<K, V, A> {
        IntoValues::new(self.tree.into_iter())
    }

    /// Returns the entry at position `index`, if any.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.as_slice().get(index).map(|(key, value)| (key, value))
    }

    /// Returns the entry at position `index` with a mutable value, if any.
    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.tree.as_mut_slice().get_mut(index).map(|(key, value)| (&*key, value))
    }

    /// Returns the first entry in the map, if any. The key of this entry is the minimum key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.get_index(0)
    }

    /// Returns the last entry in the map, if any. The key of this entry is the maximum key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.as_slice().last().map(|(key, value)| (key, value))
    }

    /// Removes and returns the first entry in the map.
    ///
    /// # Complexity
    ///
    /// O(n), every remaining entry shifts down by one.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    /// Removes and returns the last entry in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

    /// Clears the map, removing all entries. The capacity is kept.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Removes and returns the entry at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_index(&mut self, index: usize) -> (K, V) {
        self.tree.remove_index(index)
    }

    /// Removes the entries at the positions in `range` and returns the position of the entry that
    /// followed them.
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

    /// Retains only the entries specified by the predicate, visiting them in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map: FlatMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the entries with even-numbered keys.
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.tree.retain(|(key, value)| keep(&*key, value));
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.get(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.get(key).map(|(key, value)| (key, value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        let index = self.tree.find(key)?;
        Some(&mut self.tree.as_mut_slice()[index].1)
    }

    /// Returns the position of the entry for `key`, if any.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.find(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.contains(key)
    }

    /// Returns the number of entries for `key`, which is `0` or `1`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.count(key)
    }

    /// Returns the position of the first entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.lower_bound(key)
    }

    /// Returns the position of the first entry whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.upper_bound(key)
    }

    /// Returns the positions of the entries for `key`: at most one entry wide, and empty at the
    /// insertion point when the key is absent.
    pub fn equal_range<Q>(&self, key: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.equal_range(key)
    }

    /// Constructs a double-ended iterator over the entries whose keys fall within `range`.
    ///
    /// A range whose start lies after its end yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::Included;
    /// use flat_collections::FlatMap;
    ///
    /// let map = FlatMap::from([(3, "a"), (5, "b"), (8, "c")]);
    /// for (&key, &value) in map.range((Included(&4), Included(&8))) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, K, V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
        R: RangeBounds<Q>,
    {
        let positions = self.tree.key_range(&range);
        Iter::new(&self.as_slice()[positions])
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in
    /// the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.take_key(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key was previously
    /// in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.take_key(key)
    }
}

impl<K, V, C: Compare<K>, A: Allocator> FlatMap<K, V, C, A> {
    /// Inserts a key-value pair unless the key is already present.
    ///
    /// Returns the position of the new entry and `true`, or the position of the existing entry
    /// and `false`. An existing entry is never overwritten; the offered pair is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// assert_eq!(map.insert(37, "a"), (0, true));
    /// assert_eq!(map.insert(37, "b"), (0, false));
    /// assert_eq!(map[&37], "a");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (usize, bool) {
        self.tree.insert_unique((key, value))
    }

    /// Inserts a key-value pair unless the key is already present, starting the search at
    /// position `hint`. Returns the position of the entry for `key`.
    ///
    /// The result never depends on the hint.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub fn insert_hint(&mut self, hint: usize, key: K, value: V) -> usize {
        self.tree.insert_hint_unique(hint, (key, value)).0
    }
}

impl<K: Hash, V: Hash, C, A: Allocator> Hash for FlatMap<K, V, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.as_slice() {
            entry.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C, A: Allocator> PartialEq for FlatMap<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<K: Eq, V: Eq, C, A: Allocator> Eq for FlatMap<K, V, C, A> {}

impl<K: PartialOrd, V: PartialOrd, C, A: Allocator> PartialOrd for FlatMap<K, V, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().iter().partial_cmp(other.as_slice())
    }
}

impl<K: Ord, V: Ord, C, A: Allocator> Ord for FlatMap<K, V, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().iter().cmp(other.as_slice())
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator + Clone> Clone for FlatMap<K, V, C, A> {
    fn clone(&self) -> Self {
        FlatMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, A: Allocator> fmt::Debug for FlatMap<K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default, A: Allocator + Default> Default for FlatMap<K, V, C, A> {
    fn default() -> Self {
        Self::with_comparator_in(C::default(), A::default())
    }
}

impl<K, V, C: Compare<K> + Default, A: Allocator + Default> FromIterator<(K, V)> for FlatMap<K, V, C, A> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>, A: Allocator> Extend<(K, V)> for FlatMap<K, V, C, A> {
    /// Inserts every entry from `iter` with a single sort. Entries whose key is already in the
    /// map, or repeats an earlier key of `iter`, are dropped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.tree.extend_unique(iter);
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>, A: Allocator> Extend<(&'a K, &'a V)> for FlatMap<K, V, C, A> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.tree.extend_unique(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for FlatMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, V, C, A: Allocator> IntoIterator for FlatMap<K, V, C, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    fn into_iter(self) -> IntoIter<K, V, A> {
        IntoIter::new(self.tree.into_iter())
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a FlatMap<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a mut FlatMap<K, V, C, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::ops::Bound;
    use static_assertions::assert_impl_all;

    assert_impl_all!(FlatMap<String, u32>: Send, Sync, Clone, Default, Eq, Ord, Hash);

    #[test]
    fn builds_sorted_from_unsorted_pairs() {
        let map = FlatMap::from([(3, 3), (1, 1), (2, 2)]);
        assert_eq!(map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), [(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn insert_never_overwrites() {
        let mut map = FlatMap::new();
        map.insert("b", 2);
        assert_eq!(map.insert("b", 20), (0, false));
        assert_eq!(map.insert_hint(0, "a", 1), 0);
        assert_eq!(map.insert_hint(2, "b", 30), 1);
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn mutable_access_leaves_keys_sorted() {
        let mut map: FlatMap<u8, u32> = (0..5).map(|k| (k, 0)).collect();
        for (key, value) in &mut map {
            *value = u32::from(*key) * 2;
        }
        *map.get_mut(&4).unwrap() += 1;
        if let Some((_, value)) = map.get_index_mut(0) {
            *value = 100;
        }
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [100, 2, 4, 6, 9]);
        assert_eq!(map.remove_entry(&2), Some((2, 4)));
        assert_eq!(map.remove_range(..2), 0);
        assert_eq!(map.into_keys().collect::<Vec<_>>(), [3, 4]);
    }

    #[test]
    fn borrowed_key_lookups() {
        let mut map: FlatMap<String, usize> = FlatMap::new();
        map.insert(String::from("beta"), 2);
        map.insert(String::from("alpha"), 1);
        assert_eq!(map.get("alpha"), Some(&1));
        assert_eq!(map.lower_bound("b"), 1);
        assert_eq!(map.range::<str, _>((Bound::Included("a"), Bound::Excluded("b"))).count(), 1);
        assert_eq!(map.remove("beta"), Some(2));
    }
}
