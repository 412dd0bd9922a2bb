use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::error::Error;

/// An owned block of `cap` uninitialized slots for `T`, obtained from `A`.
///
/// `RawBuf` never reads, writes or drops elements; its owners track which slots are initialized.
/// Zero-sized types never touch the allocator, but the logical capacity is still recorded so
/// callers can rely on it (the ring deque needs a power of two).
pub(crate) struct RawBuf<T, A: Allocator> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: `RawBuf` uniquely owns its block, exactly like `Box<[MaybeUninit<T>], A>`.
unsafe impl<T: Send, A: Allocator + Send> Send for RawBuf<T, A> {}
// SAFETY: Shared access only hands out the raw pointer; owners gate element access.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawBuf<T, A> {}

impl<T, A: Allocator> RawBuf<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty buffer without allocating.
    pub(crate) const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Creates a buffer with exactly `cap` slots.
    pub(crate) fn try_with_capacity_in(cap: usize, alloc: A) -> Result<Self, Error> {
        let mut buf = Self::new_in(alloc);
        if cap > 0 {
            let (old_ptr, old_cap) = buf.try_replace(cap)?;
            debug_assert_eq!(old_cap, 0);
            // SAFETY: The previous block was the empty dangling block.
            unsafe { buf.release(old_ptr, old_cap) };
        }
        Ok(buf)
    }

    #[inline]
    pub(crate) const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns a pointer to slot `index`.
    ///
    /// # Safety
    /// - `index` must be at most `capacity()`.
    #[inline]
    pub(crate) const unsafe fn slot(&self, index: usize) -> *mut T {
        // SAFETY: Caller guarantees the offset stays within the block (or one past it).
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Installs a fresh block of `new_cap` slots and hands back the previous block.
    ///
    /// The caller moves whatever live elements it needs out of the old block and then passes it
    /// to [`release`](Self::release). On error the buffer is left untouched.
    pub(crate) fn try_replace(&mut self, new_cap: usize) -> Result<(NonNull<T>, usize), Error> {
        let new_ptr = if Self::IS_ZST || new_cap == 0 {
            NonNull::dangling()
        } else {
            let layout = Layout::array::<T>(new_cap).map_err(|_| Error::CapacityOverflow)?;
            if layout.size() > isize::MAX as usize {
                return Err(Error::CapacityOverflow);
            }
            self.alloc
                .allocate(layout)
                .map_err(|_| Error::ResourceExhausted {
                    bytes: layout.size(),
                })?
                .cast()
        };

        let old = (self.ptr, self.cap);
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(old)
    }

    /// Returns a block previously handed out by [`try_replace`](Self::try_replace) to the
    /// allocator.
    ///
    /// # Safety
    /// - `(ptr, cap)` must come from `try_replace` on this buffer and not have been released.
    /// - No live element may remain in the block.
    pub(crate) unsafe fn release(&self, ptr: NonNull<T>, cap: usize) {
        if Self::IS_ZST || cap == 0 {
            return;
        }
        // SAFETY: The layout was valid when the block was allocated.
        let layout = unsafe { Layout::array::<T>(cap).unwrap_unchecked() };
        // SAFETY: Caller guarantees the block came from this allocator with this layout.
        unsafe { self.alloc.deallocate(ptr.cast(), layout) };
    }
}

impl<T, A: Allocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        // SAFETY: The current block is owned by `self`; owners drop live elements first.
        unsafe { self.release(self.ptr, self.cap) };
    }
}
