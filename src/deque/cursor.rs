use core::cmp::Ordering;
use core::fmt;
use core::ptr;

use super::Deque;
use crate::allocator::{Allocator, Global};

/// A read-only position inside a [`Deque`].
///
/// A cursor names either one element or the end position, one past the last element. It
/// remembers the physical ring slot, so its logical [`index`](Cursor::index) is recomputed from
/// the deque's current head on every call.
///
/// Cursors from different deques cannot be compared; doing so panics.
///
/// # Examples
///
/// ```
/// use flat_collections::Deque;
///
/// let deque = Deque::from(['a', 'b', 'c', 'd']);
/// let mut cursor = deque.cursor_front();
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&'b'));
///
/// cursor.seek(2);
/// assert_eq!(cursor.index(), 3);
/// assert_eq!(cursor.offset_from(&deque.cursor_front()), 3);
///
/// cursor.move_next();
/// assert!(cursor == deque.cursor_end());
/// ```
pub struct Cursor<'a, T, A: Allocator = Global> {
    deque: &'a Deque<T, A>,
    slot: Option<usize>,
}

impl<'a, T, A: Allocator> Cursor<'a, T, A> {
    pub(super) const fn new(deque: &'a Deque<T, A>, slot: Option<usize>) -> Self {
        Cursor { deque, slot }
    }

    /// Returns the logical position of the cursor; the end position reports `len`.
    #[must_use]
    pub fn index(&self) -> usize {
        match self.slot {
            Some(slot) => self.deque.logical(slot),
            None => self.deque.len(),
        }
    }

    /// Returns the element under the cursor, or `None` at the end position.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        let deque = self.deque;
        // SAFETY: A cursor slot always names a live element of the borrowed deque.
        self.slot.map(|slot| unsafe { deque.slot_ref(slot) })
    }

    /// Returns `true` if the cursor is at the end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    /// Advances to the next element, or to the end position from the last element.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end position.
    pub fn move_next(&mut self) {
        let Some(slot) = self.slot else {
            panic!("`Cursor::move_next()` - cursor is at the end!");
        };
        self.slot = if self.deque.logical(slot) + 1 == self.deque.len() {
            None
        } else {
            Some((slot + 1) & self.deque.mask())
        };
    }

    /// Steps back to the previous element, or to the last element from the end position.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the first position.
    pub fn move_prev(&mut self) {
        let index = self.index();
        assert!(index > 0, "`Cursor::move_prev()` - cursor is at the front!");
        self.slot = Some(self.deque.physical(index - 1));
    }

    /// Moves the cursor by `offset` logical positions.
    ///
    /// # Panics
    ///
    /// Panics if the target lies before the front or after the end position.
    pub fn seek(&mut self, offset: isize) {
        let len = self.deque.len();
        let target = self.index().checked_add_signed(offset).filter(|&target| target <= len);
        let Some(target) = target else {
            panic!("`Cursor::seek()` - offset ({offset}) leaves the deque (index {}, len {len})!", self.index());
        };
        self.slot = (target < len).then(|| self.deque.physical(target));
    }

    /// Returns the signed logical distance from `other` to `self`.
    ///
    /// # Panics
    ///
    /// Panics if the cursors belong to different deques.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn offset_from(&self, other: &Self) -> isize {
        self.assert_same_deque(other, "offset_from");
        self.index() as isize - other.index() as isize
    }

    fn assert_same_deque(&self, other: &Self, method: &str) {
        assert!(
            ptr::eq(self.deque, other.deque),
            "`Cursor::{method}()` - cursors belong to different deques!"
        );
    }
}

impl<T, A: Allocator> Clone for Cursor<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: Allocator> Copy for Cursor<'_, T, A> {}

impl<T, A: Allocator> PartialEq for Cursor<'_, T, A> {
    /// # Panics
    ///
    /// Panics if the cursors belong to different deques.
    fn eq(&self, other: &Self) -> bool {
        self.assert_same_deque(other, "eq");
        self.slot == other.slot
    }
}

impl<T, A: Allocator> Eq for Cursor<'_, T, A> {}

impl<T, A: Allocator> PartialOrd for Cursor<'_, T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, A: Allocator> Ord for Cursor<'_, T, A> {
    /// # Panics
    ///
    /// Panics if the cursors belong to different deques.
    fn cmp(&self, other: &Self) -> Ordering {
        self.assert_same_deque(other, "cmp");
        self.index().cmp(&other.index())
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Cursor<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index())
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn wrapped() -> Deque<u32> {
        let mut deque = Deque::with_capacity(4);
        deque.push_back(2);
        deque.push_back(3);
        deque.push_front(1);
        deque.push_front(0);
        deque
    }

    #[test]
    fn walks_across_the_wrap() {
        let deque = wrapped();
        let mut cursor = deque.cursor_front();
        let mut seen = alloc::vec::Vec::new();
        while let Some(&value) = cursor.get() {
            assert_eq!(cursor.index(), seen.len());
            seen.push(value);
            cursor.move_next();
        }
        assert_eq!(seen, [0, 1, 2, 3]);
        assert!(cursor.is_end());

        cursor.move_prev();
        assert_eq!(cursor, deque.cursor_back());
        assert_eq!(cursor.get(), Some(&3));
    }

    #[test]
    fn ordering_follows_logical_position() {
        let deque = wrapped();
        let front = deque.cursor_front();
        let third = deque.cursor_at(2);
        let end = deque.cursor_at(4);
        assert!(front < third && third < end);
        assert_eq!(end, deque.cursor_end());
        assert_eq!(front.offset_from(&end), -4);
    }

    #[test]
    fn empty_deque_cursors_are_at_the_end() {
        let deque: Deque<u8> = Deque::new();
        assert!(deque.cursor_front().is_end());
        assert_eq!(deque.cursor_back(), deque.cursor_end());
        assert_eq!(deque.cursor_front().index(), 0);
    }

    #[test]
    #[should_panic(expected = "`Cursor::eq()` - cursors belong to different deques!")]
    fn cursors_of_different_deques_do_not_compare() {
        let (a, b) = (wrapped(), wrapped());
        let _ = a.cursor_front() == b.cursor_front();
    }

    #[test]
    #[should_panic(expected = "`Cursor::move_next()` - cursor is at the end!")]
    fn moving_past_the_end_panics() {
        let deque = wrapped();
        deque.cursor_end().move_next();
    }

    #[test]
    #[should_panic(expected = "`Cursor::seek()`")]
    fn seeking_before_the_front_panics() {
        let deque = wrapped();
        deque.cursor_at(1).seek(-2);
    }
}
