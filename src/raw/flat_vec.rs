use core::fmt;
use core::iter::FusedIterator;
use core::mem::ManuallyDrop;
use core::ptr;
use core::slice;

use log::trace;

use super::RawBuf;
use crate::allocator::Allocator;
use crate::error::Error;

/// Smallest non-zero capacity handed out by the growth policy.
const MIN_NON_ZERO_CAP: usize = 4;

/// A contiguous, growable store of initialized values.
///
/// This is the backing store of the flat-tree engine: slots `0..len` are initialized, the rest are
/// not. Growth doubles the capacity (starting at [`MIN_NON_ZERO_CAP`]), so references into the
/// store are invalidated exactly when a push finds it full.
pub(crate) struct FlatVec<T, A: Allocator> {
    buf: RawBuf<T, A>,
    len: usize,
}

impl<T, A: Allocator> FlatVec<T, A> {
    pub(crate) const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawBuf::new_in(alloc),
            len: 0,
        }
    }

    pub(crate) fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, Error> {
        Ok(Self {
            buf: RawBuf::try_with_capacity_in(capacity, alloc)?,
            len: 0,
        })
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub(crate) const fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: Slots `0..len` are initialized and the pointer is non-null and aligned.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As for `as_slice`, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Ensures room for at least `additional` more elements.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self.len.checked_add(additional).ok_or(Error::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let new_cap = required.max(self.capacity().saturating_mul(2)).max(MIN_NON_ZERO_CAP);
        self.try_relocate(new_cap)
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        if let Err(error) = self.try_reserve(additional) {
            handle_reserve_error::<T>(error, self.len.saturating_add(additional));
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            // Shrinking to the live length cannot overflow; only the allocator can refuse.
            if let Err(error) = self.try_relocate(self.len) {
                handle_reserve_error::<T>(error, self.len);
            }
        }
    }

    /// Moves the live elements into a fresh block of exactly `new_cap` slots.
    fn try_relocate(&mut self, new_cap: usize) -> Result<(), Error> {
        debug_assert!(new_cap >= self.len);
        trace!("flat store relocating: len={} capacity {} -> {}", self.len, self.capacity(), new_cap);
        let (old_ptr, old_cap) = self.buf.try_replace(new_cap)?;
        // SAFETY: The old block holds `len` initialized values, the new block has room for them,
        // and freshly allocated blocks never overlap live ones.
        unsafe {
            ptr::copy_nonoverlapping(old_ptr.as_ptr(), self.buf.ptr(), self.len);
            self.buf.release(old_ptr, old_cap);
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reserve(1);
        }
        // SAFETY: `len < capacity` after the reserve.
        unsafe { self.buf.slot(self.len).write(value) };
        self.len += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: Slot `len` was initialized and is now outside the live range.
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    pub(crate) fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "`FlatVec::remove()` - `index` ({index}) >= `len` ({})!", self.len);
        // SAFETY: `index` is in bounds; the tail is shifted over the vacated slot.
        unsafe {
            let slot = self.buf.slot(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Drops the elements in `start..end` and closes the gap.
    pub(crate) fn remove_range(&mut self, start: usize, end: usize) {
        assert!(start <= end, "`FlatVec::remove_range()` - `start` ({start}) > `end` ({end})!");
        assert!(end <= self.len, "`FlatVec::remove_range()` - `end` ({end}) > `len` ({})!", self.len);
        let old_len = self.len;
        // A panicking destructor leaks the tail instead of exposing dropped slots.
        self.len = start;
        // SAFETY: `start..end` is initialized; the tail `end..old_len` moves down afterwards.
        unsafe {
            let gap = slice::from_raw_parts_mut(self.buf.slot(start), end - start);
            ptr::drop_in_place(gap);
            ptr::copy(self.buf.slot(end), self.buf.slot(start), old_len - end);
        }
        self.len = old_len - (end - start);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.remove_range(len, self.len);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.truncate(0);
    }

    /// Keeps only the elements for which `keep` returns `true`, preserving order.
    pub(crate) fn retain_mut<F>(&mut self, mut keep: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let old_len = self.len;
        // Elements are compacted one at a time; a panic in `keep` or a destructor leaks the
        // unprocessed suffix.
        self.len = 0;
        let mut kept = 0;
        for index in 0..old_len {
            // SAFETY: Slot `index` is initialized and not yet moved; `kept <= index`.
            unsafe {
                let slot = self.buf.slot(index);
                if keep(&mut *slot) {
                    if kept != index {
                        ptr::copy_nonoverlapping(slot, self.buf.slot(kept), 1);
                    }
                    kept += 1;
                    self.len = kept;
                } else {
                    ptr::drop_in_place(slot);
                }
            }
        }
        self.len = kept;
    }

    /// Removes consecutive elements for which `same(later, earlier)` is `true`, keeping the first of
    /// each run.
    pub(crate) fn dedup_by<F>(&mut self, mut same: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.len < 2 {
            return;
        }
        let old_len = self.len;
        self.len = 1;
        let mut kept = 1;
        for index in 1..old_len {
            // SAFETY: Slot `index` is unprocessed; slot `kept - 1` holds the last kept element.
            unsafe {
                let slot = self.buf.slot(index);
                if same(&*slot, &*self.buf.slot(kept - 1)) {
                    ptr::drop_in_place(slot);
                } else {
                    if kept != index {
                        ptr::copy_nonoverlapping(slot, self.buf.slot(kept), 1);
                    }
                    kept += 1;
                    self.len = kept;
                }
            }
        }
        self.len = kept;
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for FlatVec<T, A> {
    fn clone(&self) -> Self {
        let mut copy = match Self::try_with_capacity_in(self.len, self.allocator().clone()) {
            Ok(copy) => copy,
            Err(error) => handle_reserve_error::<T>(error, self.len),
        };
        for value in self.as_slice() {
            copy.push(value.clone());
        }
        copy
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for FlatVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, A: Allocator> Drop for FlatVec<T, A> {
    fn drop(&mut self) {
        // SAFETY: Drops the live prefix in store order; `RawBuf` then frees the block.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T, A: Allocator> IntoIterator for FlatVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let this = ManuallyDrop::new(self);
        IntoIter {
            // SAFETY: `this` is never dropped, so the buffer is moved out exactly once.
            buf: unsafe { ptr::read(&this.buf) },
            front: 0,
            back: this.len,
        }
    }
}

/// An owning iterator over the values of a [`FlatVec`], in store order.
pub(crate) struct IntoIter<T, A: Allocator> {
    buf: RawBuf<T, A>,
    front: usize,
    back: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: Slots `front..back` are initialized and not yet yielded.
        unsafe { slice::from_raw_parts(self.buf.slot(self.front), self.back - self.front) }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: Slot `front` is initialized and is read exactly once.
        let value = unsafe { self.buf.slot(self.front).read() };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: Slot `back` is initialized and is read exactly once.
        Some(unsafe { self.buf.slot(self.back).read() })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY: Only the unyielded slots are still initialized.
        unsafe {
            let rest = slice::from_raw_parts_mut(self.buf.slot(self.front), self.back - self.front);
            ptr::drop_in_place(rest);
        }
    }
}

/// Turns a failed infallible-path reservation into the matching panic or abort.
#[cold]
pub(crate) fn handle_reserve_error<T>(error: Error, capacity: usize) -> ! {
    match error {
        Error::ResourceExhausted {
            ..
        } => {
            let layout = core::alloc::Layout::array::<T>(capacity).unwrap_or(core::alloc::Layout::new::<T>());
            alloc::alloc::handle_alloc_error(layout)
        }
        _ => panic!("capacity overflow"),
    }
}
