//! The memory resource threaded through every container.
//!
//! The standard library's `Allocator` trait is not stable yet, so this module provides a
//! minimal trait with the same shape. Containers take an allocator by value at construction,
//! expose it through an `allocator()` accessor, and route every allocation and deallocation
//! through it.

use core::alloc::Layout;
use core::ptr::NonNull;

use thiserror::Error;

/// The allocator could not satisfy a request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// A source of raw memory blocks.
///
/// # Safety
///
/// Implementations must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that stay valid until passed back to
/// [`deallocate`](Allocator::deallocate) on the same allocator (or a clone of it). Containers
/// never call `allocate` with a zero-sized layout.
pub unsafe trait Allocator {
    /// Attempts to allocate a block of memory described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the memory could not be provided.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by [`allocate`](Allocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must denote a block currently allocated by this allocator, and `layout` must be the
    /// layout that block was allocated with.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global memory allocator, backed by `alloc::alloc`.
///
/// # Examples
///
/// ```
/// use flat_collections::{FlatSet, Global, Natural};
///
/// let set: FlatSet<i32> = FlatSet::with_comparator_in(Natural, Global);
/// assert!(set.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Global;

// SAFETY: Delegates to the global allocator, which upholds the block contract.
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0, "`Global::allocate()` - zero-sized layout!");
        // SAFETY: `layout` has a non-zero size.
        NonNull::new(unsafe { alloc::alloc::alloc(layout) }).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Caller guarantees `ptr` was allocated here with `layout`.
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: Forwards to the referenced allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(Global: Allocator, Copy, Send, Sync, Default);
    assert_impl_all!(&'static Global: Allocator);

    #[test]
    fn global_round_trip() {
        let layout = Layout::array::<u64>(8).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        // SAFETY: The block is valid for `layout` and freed with the same layout.
        unsafe {
            ptr.cast::<u64>().as_ptr().write(7);
            assert_eq!(ptr.cast::<u64>().as_ptr().read(), 7);
            Global.deallocate(ptr, layout);
        }
    }
}
