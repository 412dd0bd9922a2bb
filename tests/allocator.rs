use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use flat_collections::{
    AllocError, Allocator, Deque, Error, FlatMap, FlatMultiMap, FlatMultiSet, FlatSet, Global, Natural, Reverse,
};
use pretty_assertions::assert_eq;

/// Delegates to [`Global`] and keeps a tally of live blocks and bytes.
#[derive(Default)]
struct Counting {
    live_blocks: Cell<usize>,
    live_bytes: Cell<usize>,
    allocations: Cell<usize>,
}

// SAFETY: Every block comes from and returns to `Global`.
unsafe impl Allocator for Counting {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let block = Global.allocate(layout)?;
        self.live_blocks.set(self.live_blocks.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + layout.size());
        self.allocations.set(self.allocations.get() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live_blocks.set(self.live_blocks.get() - 1);
        self.live_bytes.set(self.live_bytes.get() - layout.size());
        // SAFETY: The block was handed out by `Global` in `allocate`.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

/// Refuses every request.
#[derive(Clone, Copy, Default)]
struct Exhausted;

// SAFETY: Never hands out a block.
unsafe impl Allocator for Exhausted {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<u8>, AllocError> {
        Err(AllocError)
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unreachable!("nothing was ever allocated");
    }
}

// ─── Routing through the allocator ───────────────────────────────────────────

#[test]
fn flat_containers_release_everything() {
    let counting = Counting::default();
    {
        let mut set = FlatSet::new_in(&counting);
        for value in (0..100).rev() {
            set.insert(value);
        }
        assert_eq!(counting.live_blocks.get(), 1);
        assert_eq!(counting.live_bytes.get(), set.capacity() * size_of::<i32>());

        set.remove_range(10..);
        set.shrink_to_fit();
        assert_eq!(counting.live_bytes.get(), 10 * size_of::<i32>());

        let copy = set.clone();
        assert_eq!(counting.live_blocks.get(), 2);
        assert_eq!(copy, set);
    }
    assert_eq!(counting.live_blocks.get(), 0);
    assert_eq!(counting.live_bytes.get(), 0);
}

#[test]
fn map_entries_share_one_block() {
    let counting = Counting::default();
    let mut map = FlatMap::with_capacity_in(16, &counting);
    for key in 0..16u64 {
        map.insert(key, key * 2);
    }
    assert_eq!(counting.allocations.get(), 1);
    assert_eq!(counting.live_bytes.get(), 16 * size_of::<(u64, u64)>());
    drop(map);
    assert_eq!(counting.live_blocks.get(), 0);
}

#[test]
fn deque_capacity_is_a_power_of_two() {
    let counting = Counting::default();
    let mut deque = Deque::with_capacity_in(3, &counting);
    assert_eq!(deque.capacity(), 4);
    for value in 0..5u32 {
        deque.push_front(value);
    }
    assert_eq!(deque.capacity(), 8);
    assert_eq!(counting.allocations.get(), 2);
    assert_eq!(counting.live_bytes.get(), 8 * size_of::<u32>());

    deque.truncate(2);
    deque.shrink_to_fit();
    assert_eq!(deque.capacity(), 2);
    assert_eq!(counting.live_bytes.get(), 2 * size_of::<u32>());
    drop(deque);
    assert_eq!(counting.live_blocks.get(), 0);
}

#[test]
fn comparator_and_allocator_combine() {
    let counting = Counting::default();
    let set = FlatSet::from_iter_with_in([2, 9, 4, 9], Reverse(Natural), &counting);
    assert_eq!(set.as_slice(), &[9, 4, 2]);
    assert_eq!(counting.live_blocks.get(), 1);

    let mut map = FlatMap::with_capacity_and_comparator_in(8, Reverse(Natural), &counting);
    map.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
    assert_eq!(map.capacity(), 8);
    assert_eq!(map.as_slice(), &[(3, 'c'), (2, 'b'), (1, 'a')]);
    assert_eq!(counting.allocations.get(), 2);

    let multi = FlatMultiMap::from_iter_with_in([(1, 'x'), (0, 'y'), (1, 'z')], Natural, &counting);
    assert_eq!(multi.as_slice(), &[(0, 'y'), (1, 'x'), (1, 'z')]);
    drop((set, map, multi));
    assert_eq!(counting.live_blocks.get(), 0);
}

#[test]
fn clone_in_moves_to_another_allocator() {
    let counting = Counting::default();
    let source = FlatMultiSet::from_iter_with([5u32, 1, 5, 3], Reverse(Natural));
    let copy = source.clone_in(&counting);
    assert_eq!(copy.as_slice(), source.as_slice());
    assert_eq!(copy.comparator(), source.comparator());
    assert_eq!(counting.live_bytes.get(), 4 * size_of::<u32>());

    let map = FlatMap::from([(2, "two"), (1, "one")]).clone_in(&counting);
    assert_eq!(map.get(&1), Some(&"one"));
    assert_eq!(counting.live_blocks.get(), 2);
}

// ─── Allocation failure ──────────────────────────────────────────────────────

#[test]
fn try_reserve_reports_exhaustion() {
    let mut set: FlatSet<u64, _, Exhausted> = FlatSet::new_in(Exhausted);
    assert_eq!(set.try_reserve(8), Err(Error::ResourceExhausted { bytes: 64 }));
    assert_eq!(set.capacity(), 0);

    let mut multi: FlatMultiSet<u16, _, Exhausted> = FlatMultiSet::new_in(Exhausted);
    assert_eq!(multi.try_reserve(1), Err(Error::ResourceExhausted { bytes: 8 }));

    let mut deque: Deque<u32, Exhausted> = Deque::new_in(Exhausted);
    assert_eq!(deque.try_reserve(5), Err(Error::ResourceExhausted { bytes: 32 }));
    assert!(deque.is_empty());
}

#[test]
fn try_reserve_reports_overflow() {
    let mut deque: Deque<u8> = Deque::new();
    deque.push_back(1);
    assert_eq!(deque.try_reserve(usize::MAX), Err(Error::CapacityOverflow));

    let mut map: FlatMap<u8, u8> = FlatMap::new();
    assert_eq!(map.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    assert_eq!(deque.front(), Some(&1));
}
