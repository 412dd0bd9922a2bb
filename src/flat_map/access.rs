use core::ops::Index;

use super::FlatMap;
use crate::allocator::Allocator;
use crate::compare::Compare;
use crate::error::Error;

impl<K, V, C, A: Allocator> FlatMap<K, V, C, A> {
    /// Returns a reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map has no entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::{Error, FlatMap};
    ///
    /// let map = FlatMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the map has no entry for `key`.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        Q: ?Sized,
        C: Compare<K, Q>,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }
}

impl<K, V, C: Compare<K>, A: Allocator> FlatMap<K, V, C, A> {
    /// Inserts `(key, make())` if the map has no entry for `key`.
    ///
    /// `make` only runs when the entry is created. Returns the position of the entry for `key`
    /// and whether it was created; an existing value is never touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// assert_eq!(map.try_emplace("a", || 1), (0, true));
    /// assert_eq!(map.try_emplace("a", || unreachable!()), (0, false));
    /// assert_eq!(map[&"a"], 1);
    /// ```
    pub fn try_emplace<F>(&mut self, key: K, make: F) -> (usize, bool)
    where
        F: FnOnce() -> V,
    {
        let position = self.tree.lower_bound(&key);
        self.emplace_at(position, key, make)
    }

    /// [`try_emplace`](Self::try_emplace), starting the search at position `hint`.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub fn try_emplace_hint<F>(&mut self, hint: usize, key: K, make: F) -> (usize, bool)
    where
        F: FnOnce() -> V,
    {
        let position = self.tree.lower_bound_hint(hint, &key);
        self.emplace_at(position, key, make)
    }

    fn emplace_at<F>(&mut self, position: usize, key: K, make: F) -> (usize, bool)
    where
        F: FnOnce() -> V,
    {
        if self.tree.matches_at(position, &key) {
            (position, false)
        } else {
            (self.tree.insert_at(position, (key, make())), true)
        }
    }

    /// Inserts `(key, value)`, or assigns `value` to the existing entry for `key`.
    ///
    /// Returns the position of the entry and `true` if it was inserted, `false` if it was
    /// assigned. On assignment the stored key is kept and the offered `key` is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut map = FlatMap::new();
    /// assert_eq!(map.insert_or_assign(7, "x"), (0, true));
    /// assert_eq!(map.insert_or_assign(7, "y"), (0, false));
    /// assert_eq!(map.get(&7), Some(&"y"));
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (usize, bool) {
        let position = self.tree.lower_bound(&key);
        self.assign_at(position, key, value)
    }

    /// [`insert_or_assign`](Self::insert_or_assign), starting the search at position `hint`.
    ///
    /// # Panics
    ///
    /// Panics if `hint > len`.
    pub fn insert_or_assign_hint(&mut self, hint: usize, key: K, value: V) -> (usize, bool) {
        let position = self.tree.lower_bound_hint(hint, &key);
        self.assign_at(position, key, value)
    }

    fn assign_at(&mut self, position: usize, key: K, value: V) -> (usize, bool) {
        if self.tree.matches_at(position, &key) {
            self.tree.as_mut_slice()[position].1 = value;
            (position, false)
        } else {
            (self.tree.insert_at(position, (key, value)), true)
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting `V::default()` first if the
    /// map has no entry for it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::FlatMap;
    ///
    /// let mut counts: FlatMap<char, usize> = FlatMap::new();
    /// for c in "hello".chars() {
    ///     *counts.get_or_insert_default(c) += 1;
    /// }
    /// assert_eq!(counts[&'l'], 2);
    /// assert_eq!(counts.len(), 4);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (position, _) = self.try_emplace(key, V::default);
        &mut self.tree.as_mut_slice()[position].1
    }
}

impl<K, Q, V, C, A> Index<&Q> for FlatMap<K, V, C, A>
where
    Q: ?Sized,
    C: Compare<K, Q>,
    A: Allocator,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}
