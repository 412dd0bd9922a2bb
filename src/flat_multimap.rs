use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Range, RangeBounds};

use crate::allocator::{Allocator, Global};
use crate::compare::{Compare, Natural};
use crate::raw::{self, First, FlatTree};

mod capacity;

pub use crate::flat_map::{IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut};

/// An ordered multimap stored as a single sorted array of `(key, value)` entries.
///
/// Like [`FlatMap`](crate::FlatMap), but a key may appear any number of times. Entries with
/// equivalent keys form one contiguous run in insertion order.
///
/// # Examples
///
/// ```
/// use flat_collections::FlatMultiMap;
///
/// let mut authors = FlatMultiMap::new();
/// authors.insert("Pratchett", "Mort");
/// authors.insert("Le Guin", "The Dispossessed");
/// authors.insert("Pratchett", "Small Gods");
///
/// let books: Vec<_> = authors.get_all("Pratchett").copied().collect();
/// assert_eq!(books, ["Mort", "Small Gods"]);
/// assert_eq!(authors.count("Le Guin"), 1);
/// ```
pub struct FlatMultiMap<K, V, C = Natural, A: Allocator = Global> {
    tree: FlatTree<(K, V), First, C, A>,
}

impl<K, V> FlatMultiMap<K, V> {
    /// Makes a new, empty `FlatMultiMap` ordered by [`Ord`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator_in(Natural, Global)
    }
}

impl<K, V, C> FlatMultiMap<K, V, C> {
    /// Makes a new, empty `FlatMultiMap` ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_in(cmp, Global)
    }

    /// Builds a multimap ordered by `cmp` from `iter`, keeping entries with equivalent keys in
    /// input order.
    pub fn from_iter_with<I>(iter: I, cmp: C) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        C: Compare<K>,
    {
        Self::from_iter_with_in(iter, cmp, Global)
    }
}

impl<K, V, A: Allocator> FlatMultiMap<K, V, Natural, A> {
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self::with_comparator_in(Natural, alloc)
    }
}

impl<K, V, C, A: Allocator> FlatMultiMap<K, V, C, A> {
    #[must_use]
    pub const fn with_comparator_in(cmp: C, alloc: A) -> Self {
        FlatMultiMap {
            tree: FlatTree::new_in(cmp, alloc),
        }
    }

    /// Builds a multimap ordered by `cmp` from `iter`, allocated from `alloc`. Entries with equivalent keys keep their input order.
    pub fn from_iter_with_in<I>(iter: I, cmp: C, alloc: A) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        C: Compare<K>,
    {
        let mut map = Self::with_comparator_in(cmp, alloc);
        map.tree.extend_multi(iter);
        map
    }

    /// Clones the multimap into a new one that allocates from `alloc`.
    #[must_use]
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> FlatMultiMap<K, V, C, B>
    where
        K: Clone,
        V: Clone,
        C: Clone,
    {
        FlatMultiMap {
            tree: self.tree.clone_in(alloc),
        }
    }

    /// Returns the number of entries, counting every entry of a repeated key.
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

    #[must_use]
    pub fn as_slice(&self) -> &[(K, V)] {
        self.tree.as_slice()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.as_slice())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.tree.as_mut_slice())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.as_slice())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.as_slice())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.tree.as_mut_slice())
    }

    pub fn into_keys(self) -> IntoKeys<K, V, A> {
        IntoKeys::new(self.tree.into_iter())
    }

    pub fn into_values(self) -> IntoValues<K, V, A> {
        IntoValues::new(self.tree.into_iter())
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.as_slice().get(index).map(|(key, value)| (key, value))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<(&K, &mut V)> {
        self.tree.as_mut_slice().get_mut(index).map(|(key, value)| (&*key, value))
    }

    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.get_index(0)
    }

    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.as_slice().last().map(|(key, value)| (key, value))
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }

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

    /// Retains only the entries specified by the predicate, visiting them in order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.tree.retain(|(key, value)| keep(&*key, value));
    }

    /// Returns the value of the first entry for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.get(key).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value of the first entry for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        let index = self.tree.find(key)?;
        Some(&mut self.tree.as_mut_slice()[index].1)
    }

    /// Gets an iterator over the values of every entry for `key`, in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMultiMap;
    ///
    /// let map: FlatMultiMap<u8, char> = [(2, 'x'), (1, 'a'), (2, 'y')].into_iter().collect();
    /// assert!(map.get_all(&2).eq(&['x', 'y']));
    /// assert_eq!(map.get_all(&3).len(), 0);
    /// ```
    pub fn get_all<Q>(&self, key: &Q) -> Values<'_, K, V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        let run = self.tree.equal_range(key);
        Values::new(&self.as_slice()[run])
    }

    /// Returns the position of the first entry for `key`, if any.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.find(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.contains(key)
    }

    /// Returns the number of entries for `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.count(key)
    }

    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.lower_bound(key)
    }

    pub fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.upper_bound(key)
    }

    /// Returns the positions of the run of entries for `key`.
    pub fn equal_range<Q>(&self, key: &Q) -> Range<usize>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.equal_range(key)
    }

    /// Constructs a double-ended iterator over the entries whose keys fall within `range`.
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, K, V>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
        R: RangeBounds<Q>,
    {
        let positions = self.tree.key_range(&range);
        Iter::new(&self.as_slice()[positions])
    }

    /// Removes every entry for `key` and returns how many were removed.
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.tree.remove_key(key)
    }
}

impl<K, V, C: Compare<K>, A: Allocator> FlatMultiMap<K, V, C, A> {
    /// Inserts a key-value pair after every entry with an equivalent key and returns its
    /// position.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        self.tree.insert_multi((key, value))
    }

    /// Inserts a key-value pair after every entry with an equivalent key, starting the search at
    /// position `hint`, and returns its position.
    ///
    /// The result never depends on the hint.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub fn insert_hint(&mut self, hint: usize, key: K, value: V) -> usize {
        self.tree.insert_hint_multi(hint, (key, value))
    }
}

impl<K: Hash, V: Hash, C, A: Allocator> Hash for FlatMultiMap<K, V, C, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.as_slice() {
            entry.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C, A: Allocator> PartialEq for FlatMultiMap<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<K: Eq, V: Eq, C, A: Allocator> Eq for FlatMultiMap<K, V, C, A> {}

impl<K: PartialOrd, V: PartialOrd, C, A: Allocator> PartialOrd for FlatMultiMap<K, V, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().iter().partial_cmp(other.as_slice())
    }
}

impl<K: Ord, V: Ord, C, A: Allocator> Ord for FlatMultiMap<K, V, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().iter().cmp(other.as_slice())
    }
}

impl<K: Clone, V: Clone, C: Clone, A: Allocator + Clone> Clone for FlatMultiMap<K, V, C, A> {
    fn clone(&self) -> Self {
        FlatMultiMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, A: Allocator> fmt::Debug for FlatMultiMap<K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default, A: Allocator + Default> Default for FlatMultiMap<K, V, C, A> {
    fn default() -> Self {
        Self::with_comparator_in(C::default(), A::default())
    }
}

impl<K, V, C: Compare<K> + Default, A: Allocator + Default> FromIterator<(K, V)> for FlatMultiMap<K, V, C, A> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>, A: Allocator> Extend<(K, V)> for FlatMultiMap<K, V, C, A> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.tree.extend_multi(iter);
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>, A: Allocator> Extend<(&'a K, &'a V)> for FlatMultiMap<K, V, C, A> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.tree.extend_multi(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for FlatMultiMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, V, C, A: Allocator> IntoIterator for FlatMultiMap<K, V, C, A> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, A>;

    fn into_iter(self) -> IntoIter<K, V, A> {
        IntoIter::new(self.tree.into_iter())
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a FlatMultiMap<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C, A: Allocator> IntoIterator for &'a mut FlatMultiMap<K, V, C, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
