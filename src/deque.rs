//! A double-ended queue over a power-of-two ring buffer.
//!
//! [`Deque`] keeps its elements in one allocation treated as a ring: the first element sits at
//! physical slot `head`, the next free back slot is `tail`, and every index is wrapped with a
//! bit mask. Pushing or popping at either end is O(1) amortized. Inserting or removing in the
//! middle moves whichever side of the ring is shorter.
//!
//! A [`Cursor`] borrows the deque and names one element (or the end position) by its physical
//! slot, translating to logical positions on demand.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Index, IndexMut, RangeBounds};
use core::ptr;
use core::slice;

use alloc::vec::Vec;
use log::trace;
use smallvec::SmallVec;

use crate::allocator::{Allocator, Global};
use crate::error::Error;
use crate::raw::{self, RawBuf, handle_reserve_error};

mod cursor;
mod iter;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};

/// A double-ended queue implemented with a growable ring buffer.
///
/// The capacity is always zero or a power of two. A push on a full deque doubles the capacity
/// and lays the elements out again in logical order from slot 0.
///
/// # Examples
///
/// ```
/// use flat_collections::Deque;
///
/// let mut deque: Deque<u32> = Deque::with_capacity(4);
/// deque.extend([2, 3, 4]);
/// deque.push_front(1);
/// assert_eq!(deque.capacity(), 4);
///
/// deque.push_back(5);
/// assert_eq!(deque.capacity(), 8);
/// assert_eq!(deque.front(), Some(&1));
/// assert!(deque.iter().copied().eq(1..=5));
/// ```
pub struct Deque<T, A: Allocator = Global> {
    buf: RawBuf<T, A>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Deque<T> {
    /// Creates an empty deque. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty deque with room for at least `capacity` elements. The capacity is
    /// rounded up to a power of two.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let deque: Deque<u8> = Deque::with_capacity(5);
    /// assert_eq!(deque.capacity(), 8);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: Allocator> Deque<T, A> {
    /// Creates an empty deque that allocates from `alloc`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Deque {
            buf: RawBuf::new_in(alloc),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Creates an empty deque with room for at least `capacity` elements, allocated from `alloc`.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity overflows `usize`.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let mut deque = Self::new_in(alloc);
        deque.reserve(capacity);
        deque
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the deque can hold without reallocating. Always zero or a
    /// power of two.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[must_use]
    pub const fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    #[inline]
    const fn mask(&self) -> usize {
        self.capacity().wrapping_sub(1)
    }

    /// Physical slot of logical position `index`.
    #[inline]
    const fn physical(&self, index: usize) -> usize {
        self.head.wrapping_add(index) & self.mask()
    }

    /// Logical position of the element in physical slot `slot`.
    #[inline]
    const fn logical(&self, slot: usize) -> usize {
        slot.wrapping_sub(self.head) & self.mask()
    }

    /// # Safety
    /// - `slot` must hold a live element.
    #[inline]
    unsafe fn slot_ref(&self, slot: usize) -> &T {
        // SAFETY: Caller guarantees the slot is initialized.
        unsafe { &*self.buf.slot(slot) }
    }

    /// Swaps the elements at logical positions `i` and `j`, both `< len`.
    #[inline]
    fn swap_logical(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.len && j < self.len);
        // SAFETY: Both positions are live; `ptr::swap` allows `i == j`.
        unsafe { ptr::swap(self.buf.slot(self.physical(i)), self.buf.slot(self.physical(j))) }
    }

    /// Reverses the elements at logical positions `start..end`.
    fn reverse_logical(&mut self, mut start: usize, mut end: usize) {
        while start + 1 < end {
            end -= 1;
            self.swap_logical(start, end);
            start += 1;
        }
    }

    /// Moves `split..end` in front of `start..split`, all in logical positions.
    fn rotate_logical(&mut self, start: usize, split: usize, end: usize) {
        self.reverse_logical(start, split);
        self.reverse_logical(split, end);
        self.reverse_logical(start, end);
    }

    /// Moves the live elements into a fresh ring of `new_cap` slots, in logical order from slot 0.
    fn try_relocate(&mut self, new_cap: usize) -> Result<(), Error> {
        debug_assert!(new_cap >= self.len && (new_cap == 0 || new_cap.is_power_of_two()));
        trace!("deque ring relocating: len={} capacity {} -> {}", self.len, self.capacity(), new_cap);
        let old_head = self.head;
        let (old_ptr, old_cap) = self.buf.try_replace(new_cap)?;
        let first = if self.len == 0 { 0 } else { (old_cap - old_head).min(self.len) };
        // SAFETY: The old ring holds `first` live elements from `old_head` and the rest from slot
        // 0; the new block is distinct and has room for all of them.
        unsafe {
            ptr::copy_nonoverlapping(old_ptr.as_ptr().add(old_head), self.buf.ptr(), first);
            ptr::copy_nonoverlapping(old_ptr.as_ptr(), self.buf.ptr().add(first), self.len - first);
            self.buf.release(old_ptr, old_cap);
        }
        self.head = 0;
        self.tail = self.len & self.mask();
        Ok(())
    }

    /// Doubles the ring, starting from one slot.
    fn grow(&mut self) {
        let new_cap = match self.capacity().checked_mul(2) {
            Some(0) => 1,
            Some(new_cap) => new_cap,
            None => handle_reserve_error::<T>(Error::CapacityOverflow, usize::MAX),
        };
        if let Err(error) = self.try_relocate(new_cap) {
            handle_reserve_error::<T>(error, new_cap);
        }
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the rounded capacity overflows, or
    /// [`Error::ResourceExhausted`] if the allocator fails. The deque is unchanged on error.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self.len.checked_add(additional).ok_or(Error::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let new_cap = required.checked_next_power_of_two().ok_or(Error::CapacityOverflow)?;
        self.try_relocate(new_cap)
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(error) = self.try_reserve(additional) {
            handle_reserve_error::<T>(error, self.len.saturating_add(additional));
        }
    }

    /// Shrinks the capacity to the smallest power of two that holds every element.
    pub fn shrink_to_fit(&mut self) {
        let target = if self.len == 0 { 0 } else { self.len.next_power_of_two() };
        if target < self.capacity() {
            if let Err(error) = self.try_relocate(target) {
                handle_reserve_error::<T>(error, target);
            }
        }
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Complexity
    ///
    /// O(1) amortized.
    pub fn push_back(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow();
        }
        // SAFETY: The ring has a free slot at `tail`.
        unsafe { self.buf.slot(self.tail).write(value) };
        self.tail = (self.tail + 1) & self.mask();
        self.len += 1;
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Complexity
    ///
    /// O(1) amortized.
    pub fn push_front(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow();
        }
        self.head = self.head.wrapping_sub(1) & self.mask();
        // SAFETY: The slot before the old head is free.
        unsafe { self.buf.slot(self.head).write(value) };
        self.len += 1;
    }

    /// Removes the last element and returns it, or `None` if the deque is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.tail = self.tail.wrapping_sub(1) & self.mask();
        self.len -= 1;
        // SAFETY: The slot was the last live one and is now outside the live range.
        Some(unsafe { self.buf.slot(self.tail).read() })
    }

    /// Removes the first element and returns it, or `None` if the deque is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let slot = self.head;
        self.head = (self.head + 1) & self.mask();
        self.len -= 1;
        // SAFETY: The slot was the first live one and is now outside the live range.
        Some(unsafe { self.buf.slot(slot).read() })
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        let last = self.len.checked_sub(1)?;
        self.get_mut(last)
    }

    /// Returns the element at logical position `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            // SAFETY: `index < len`, so its slot is live.
            Some(unsafe { self.slot_ref(self.physical(index)) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            // SAFETY: `index < len`, so its slot is live; `&mut self` makes the borrow unique.
            Some(unsafe { &mut *self.buf.slot(self.physical(index)) })
        } else {
            None
        }
    }

    /// Returns the element at logical position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::{Deque, Error};
    ///
    /// let deque = Deque::from([10, 20]);
    /// assert_eq!(deque.at(1), Ok(&20));
    /// assert_eq!(deque.at(2), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        self.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len,
        })
    }

    /// Swaps the elements at logical positions `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        assert!(i < self.len, "`Deque::swap()` - `i` ({i}) >= `len` ({})!", self.len);
        assert!(j < self.len, "`Deque::swap()` - `j` ({j}) >= `len` ({})!", self.len);
        self.swap_logical(i, j);
    }

    /// Returns `true` if the deque contains an element equal to `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let (front, back) = self.as_slices();
        front.contains(value) || back.contains(value)
    }

    /// Returns the contents as two slices: the run from `head` to the end of the ring, then the
    /// wrapped-around run from slot 0. The second slice is empty when the contents do not wrap.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let mut deque: Deque<i32> = Deque::with_capacity(4);
    /// deque.push_back(2);
    /// deque.push_back(3);
    /// deque.push_front(1);
    /// assert_eq!(deque.as_slices(), (&[1][..], &[2, 3][..]));
    /// ```
    #[must_use]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let first = self.first_run();
        // SAFETY: The two runs cover exactly the live slots and do not overlap.
        unsafe {
            (
                slice::from_raw_parts(self.buf.slot(self.head), first),
                slice::from_raw_parts(self.buf.ptr(), self.len - first),
            )
        }
    }

    /// Mutable version of [`as_slices`](Self::as_slices).
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let first = self.first_run();
        // SAFETY: As for `as_slices`; the runs are disjoint, so both may be mutable.
        unsafe {
            (
                slice::from_raw_parts_mut(self.buf.slot(self.head), first),
                slice::from_raw_parts_mut(self.buf.ptr(), self.len - first),
            )
        }
    }

    /// Number of live elements between `head` and the physical end of the ring.
    #[inline]
    fn first_run(&self) -> usize {
        if self.len == 0 { 0 } else { (self.capacity() - self.head).min(self.len) }
    }

    /// Returns a front-to-back iterator.
    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slices();
        Iter::new(front, back)
    }

    /// Returns a front-to-back iterator that allows modifying each element.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (front, back) = self.as_mut_slices();
        IterMut::new(front, back)
    }

    /// Inserts `value` at logical position `index`, shifting the shorter side of the ring.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let mut deque = Deque::from(['a', 'b', 'c']);
    /// deque.insert(1, 'x');
    /// assert!(deque.iter().eq(&['a', 'x', 'b', 'c']));
    /// ```
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len, "`Deque::insert()` - `index` ({index}) > `len` ({})!", self.len);
        if index < self.len - index {
            self.push_front(value);
            for i in 0..index {
                self.swap_logical(i, i + 1);
            }
        } else {
            self.push_back(value);
            for i in (index..self.len - 1).rev() {
                self.swap_logical(i, i + 1);
            }
        }
    }

    /// Inserts every element of `values` at logical position `index`, keeping their order.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let mut deque = Deque::from([1, 5]);
    /// deque.insert_many(1, [2, 3, 4]);
    /// assert!(deque.iter().copied().eq(1..=5));
    /// ```
    pub fn insert_many<I>(&mut self, index: usize, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        assert!(index <= self.len, "`Deque::insert_many()` - `index` ({index}) > `len` ({})!", self.len);
        let values: SmallVec<[T; 8]> = values.into_iter().collect();
        let count = values.len();
        if count == 0 {
            return;
        }
        self.reserve(count);
        if index < self.len - index {
            for value in values.into_iter().rev() {
                self.push_front(value);
            }
            self.rotate_logical(0, count, count + index);
        } else {
            let old_len = self.len;
            for value in values {
                self.push_back(value);
            }
            self.rotate_logical(index, old_len, self.len);
        }
    }

    /// Removes and returns the element at logical position `index`, shifting the shorter side of
    /// the ring. Returns `None` if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        if index < self.len - 1 - index {
            for i in (0..index).rev() {
                self.swap_logical(i, i + 1);
            }
            self.pop_front()
        } else {
            for i in index..self.len - 1 {
                self.swap_logical(i, i + 1);
            }
            self.pop_back()
        }
    }

    /// Removes the elements at the logical positions in `range`, shifting the shorter side of the
    /// ring.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let mut deque: Deque<_> = (0..8).collect();
    /// deque.remove_range(2..5);
    /// assert!(deque.iter().copied().eq([0, 1, 5, 6, 7]));
    /// ```
    pub fn remove_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        let range = raw::index_range(&range, self.len);
        let count = range.len();
        if count == 0 {
            return;
        }
        if range.start < self.len - range.end {
            self.rotate_logical(0, range.start, range.end);
            for _ in 0..count {
                drop(self.pop_front());
            }
        } else {
            let len = self.len;
            self.rotate_logical(range.start, range.end, len);
            for _ in 0..count {
                drop(self.pop_back());
            }
        }
    }

    /// Keeps the first `len` elements and drops the rest.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            drop(self.pop_back());
        }
    }

    /// Removes every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.head = 0;
        self.tail = 0;
    }

    /// Resizes the deque to `new_len`, filling new back slots with the results of `fill`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if new_len > self.len {
            self.reserve(new_len - self.len);
            while self.len < new_len {
                self.push_back(fill());
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// Resizes the deque to `new_len`, filling new back slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone());
    }

    /// Keeps only the elements for which `keep` returns `true`, in their original order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_collections::Deque;
    ///
    /// let mut deque: Deque<_> = (1..=6).collect();
    /// deque.retain(|&x| x % 3 != 0);
    /// assert!(deque.iter().copied().eq([1, 2, 4, 5]));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut kept = 0;
        for index in 0..self.len {
            // SAFETY: `index < len`.
            let retain = keep(unsafe { self.slot_ref(self.physical(index)) });
            if retain {
                self.swap_logical(kept, index);
                kept += 1;
            }
        }
        self.truncate(kept);
    }

    /// Returns a cursor at the first element, or at the end position if the deque is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, (!self.is_empty()).then_some(self.head))
    }

    /// Returns a cursor at the last element, or at the end position if the deque is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, self.len.checked_sub(1).map(|last| self.physical(last)))
    }

    /// Returns a cursor at the end position, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, None)
    }

    /// Returns a cursor at logical position `index`; `index == len` gives the end position.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T, A> {
        assert!(index <= self.len, "`Deque::cursor_at()` - `index` ({index}) > `len` ({})!", self.len);
        Cursor::new(self, (index < self.len).then(|| self.physical(index)))
    }
}

impl<T, A: Allocator> Drop for Deque<T, A> {
    fn drop(&mut self) {
        let (front, back) = self.as_mut_slices();
        // SAFETY: Both runs are live and dropped exactly once; `RawBuf` then frees the ring.
        unsafe {
            ptr::drop_in_place(front);
            ptr::drop_in_place(back);
        }
    }
}

impl<T, A: Allocator> Index<usize> for Deque<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("`Deque::index()` - `index` ({index}) >= `len` ({})!", self.len),
        }
    }
}

impl<T, A: Allocator> IndexMut<usize> for Deque<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("`Deque::index_mut()` - `index` ({index}) >= `len` ({len})!"),
        }
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for Deque<T, A> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity_in(self.len, self.allocator().clone());
        copy.extend(self.iter().cloned());
        copy
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Deque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: Allocator + Default> Default for Deque<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: PartialEq, A: Allocator> PartialEq for Deque<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator> Eq for Deque<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for Deque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: Allocator> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: Allocator> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T, A: Allocator + Default> FromIterator<T> for Deque<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::default();
        deque.extend(iter);
        deque
    }
}

impl<T, A: Allocator> Extend<T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: 'a + Copy, A: Allocator> Extend<&'a T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for Deque<T> {
    fn from(vec: Vec<T>) -> Self {
        vec.into_iter().collect()
    }
}

impl<T, A: Allocator> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::rc::Rc;
    use core::cell::Cell;
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(Deque<u32>: Send, Sync, Clone, Default, Eq, Ord, Hash);

    impl<T, A: Allocator> Deque<T, A> {
        /// Panics if the ring bookkeeping is inconsistent.
        fn validate_invariants(&self) {
            let cap = self.capacity();
            assert!(cap == 0 || cap.is_power_of_two(), "capacity {cap} is not a power of two");
            assert!(self.len <= cap, "len {} exceeds capacity {cap}", self.len);
            if cap > 0 {
                assert_eq!(self.tail, (self.head + self.len) & (cap - 1), "tail out of step");
            }
            let (front, back) = self.as_slices();
            assert_eq!(front.len() + back.len(), self.len);
        }
    }

    /// A full deque whose ring wraps: capacity 8, head at slot 4.
    fn wrapped() -> Deque<u32> {
        let mut deque = Deque::with_capacity(8);
        for value in 2..8 {
            deque.push_back(value);
        }
        deque.push_front(1);
        deque.push_front(0);
        for _ in 0..2 {
            let value = deque.pop_back().unwrap();
            deque.push_front(value + 100);
        }
        deque
    }

    #[test]
    fn growth_doubles_and_restores_order() {
        let mut deque: Deque<u32> = Deque::with_capacity(4);
        deque.push_back(2);
        deque.push_back(3);
        deque.push_front(1);
        deque.push_front(0);
        assert_eq!(deque.capacity(), 4);
        deque.push_back(4);
        assert_eq!(deque.capacity(), 8);
        assert_eq!(deque.front(), Some(&0));
        assert_eq!(deque.as_slices().0, &[0, 1, 2, 3, 4]);
        deque.validate_invariants();
    }

    #[test]
    fn first_push_allocates_one_slot() {
        let mut deque = Deque::new();
        deque.push_front('a');
        assert_eq!(deque.capacity(), 1);
        deque.push_front('b');
        assert_eq!(deque.capacity(), 2);
        assert_eq!(deque.pop_back(), Some('a'));
        deque.validate_invariants();
    }

    #[test]
    fn wrapped_ring_reads_in_logical_order() {
        let deque = wrapped();
        deque.validate_invariants();
        assert_eq!(deque.capacity(), 8);
        assert!(!deque.as_slices().1.is_empty());
        assert!(deque.iter().copied().eq([106, 107, 0, 1, 2, 3, 4, 5]));
        assert!(deque.iter().rev().copied().eq([5, 4, 3, 2, 1, 0, 107, 106]));
        assert_eq!(deque[2], 0);
    }

    #[test]
    fn middle_edits_on_wrapped_ring() {
        let mut deque = wrapped();
        assert_eq!(deque.remove(1), Some(107));
        assert_eq!(deque.remove(5), Some(4));
        deque.insert(3, 50);
        deque.insert(6, 60);
        assert!(deque.iter().copied().eq([106, 0, 1, 50, 2, 3, 60, 5]));
        deque.remove_range(1..3);
        deque.remove_range(4..);
        assert!(deque.iter().copied().eq([106, 50, 2, 3]));
        deque.insert_many(1, [7, 8]);
        deque.insert_many(5, [9]);
        assert!(deque.iter().copied().eq([106, 7, 8, 50, 2, 9, 3]));
        deque.validate_invariants();
    }

    #[test]
    fn shrink_keeps_power_of_two() {
        let mut deque = wrapped();
        deque.truncate(3);
        deque.shrink_to_fit();
        assert_eq!(deque.capacity(), 4);
        assert!(deque.iter().copied().eq([106, 107, 0]));
        deque.clear();
        deque.shrink_to_fit();
        assert_eq!(deque.capacity(), 0);
        deque.validate_invariants();
    }

    #[test]
    fn drops_every_element_once() {
        struct Counted(Rc<Cell<usize>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let mut deque = Deque::new();
        for _ in 0..6 {
            deque.push_front(Counted(Rc::clone(&drops)));
        }
        deque.remove_range(1..3);
        assert_eq!(drops.get(), 2);
        deque.retain(|_| false);
        assert_eq!(drops.get(), 6);
        for _ in 0..3 {
            deque.push_back(Counted(Rc::clone(&drops)));
        }
        let mut iter = deque.into_iter();
        drop(iter.next_back());
        drop(iter);
        assert_eq!(drops.get(), 9);
    }

    #[test]
    #[should_panic(expected = "`Deque::insert()` - `index` (3) > `len` (2)!")]
    fn insert_past_end_panics() {
        let mut deque = Deque::from([1, 2]);
        deque.insert(3, 0);
    }

    #[test]
    fn zero_sized_elements() {
        let mut deque = Deque::new();
        for _ in 0..5 {
            deque.push_back(());
        }
        assert_eq!(deque.len(), 5);
        assert_eq!(deque.capacity(), 8);
        assert_eq!(deque.remove(2), Some(()));
        assert_eq!(deque.iter().count(), 4);
    }

    #[derive(Clone, Debug)]
    enum Operation {
        PushBack(u16),
        PushFront(u16),
        PopBack,
        PopFront,
        Insert(usize, u16),
        Remove(usize),
        RemoveRange(usize, usize),
        InsertMany(usize, u8),
        Retain(u16),
        Shrink,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            6 => any::<u16>().prop_map(Operation::PushBack),
            6 => any::<u16>().prop_map(Operation::PushFront),
            3 => Just(Operation::PopBack),
            3 => Just(Operation::PopFront),
            2 => (any::<usize>(), any::<u16>()).prop_map(|(i, v)| Operation::Insert(i, v)),
            2 => any::<usize>().prop_map(Operation::Remove),
            1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Operation::RemoveRange(a, b)),
            1 => (any::<usize>(), 0u8..12).prop_map(|(i, n)| Operation::InsertMany(i, n)),
            1 => (1u16..5).prop_map(Operation::Retain),
            1 => Just(Operation::Shrink),
        ]
    }

    proptest! {
        #[test]
        fn deque_behaves_like_vec_deque(operations in prop::collection::vec(strategy(), 0..300)) {
            let mut model: VecDeque<u16> = VecDeque::new();
            let mut deque: Deque<u16> = Deque::new();

            for operation in operations {
                match operation {
                    Operation::PushBack(v) => {
                        deque.push_back(v);
                        model.push_back(v);
                    }
                    Operation::PushFront(v) => {
                        deque.push_front(v);
                        model.push_front(v);
                    }
                    Operation::PopBack => prop_assert_eq!(deque.pop_back(), model.pop_back()),
                    Operation::PopFront => prop_assert_eq!(deque.pop_front(), model.pop_front()),
                    Operation::Insert(i, v) => {
                        let i = i % (model.len() + 1);
                        deque.insert(i, v);
                        model.insert(i, v);
                    }
                    Operation::Remove(i) => {
                        let i = i % (model.len() + 1);
                        prop_assert_eq!(deque.remove(i), model.remove(i));
                    }
                    Operation::RemoveRange(a, b) => {
                        let a = a % (model.len() + 1);
                        let b = b % (model.len() + 1);
                        let (start, end) = (a.min(b), a.max(b));
                        deque.remove_range(start..end);
                        model.drain(start..end);
                    }
                    Operation::InsertMany(i, n) => {
                        let i = i % (model.len() + 1);
                        let values: Vec<u16> = (0..u16::from(n)).map(|k| k + 1000).collect();
                        deque.insert_many(i, values.iter().copied());
                        for (offset, value) in values.into_iter().enumerate() {
                            model.insert(i + offset, value);
                        }
                    }
                    Operation::Retain(m) => {
                        deque.retain(|v| v % m != 0);
                        model.retain(|v| v % m != 0);
                    }
                    Operation::Shrink => deque.shrink_to_fit(),
                }

                deque.validate_invariants();
                prop_assert_eq!(deque.len(), model.len());
                prop_assert!(deque.iter().eq(model.iter()));
                prop_assert!(deque.iter().rev().eq(model.iter().rev()));
            }
        }
    }
}
