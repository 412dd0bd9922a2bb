use core::ops::{Bound, Range, RangeBounds};

mod flat_tree;
mod flat_vec;
mod key;
mod raw_buf;

pub(crate) use flat_tree::FlatTree;
pub(crate) use flat_vec::{IntoIter, handle_reserve_error};
pub(crate) use key::{First, Identity};
pub(crate) use raw_buf::RawBuf;

/// Resolves a positional range against a container of `len` elements.
///
/// # Panics
///
/// Panics if the range is decreasing or extends past `len`.
pub(crate) fn index_range<R>(range: &R, len: usize) -> Range<usize>
where
    R: RangeBounds<usize>,
{
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => {
            assert!(start < usize::MAX, "`remove_range()` - range start overflows `usize`!");
            start + 1
        }
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => {
            assert!(end < usize::MAX, "`remove_range()` - range end overflows `usize`!");
            end + 1
        }
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    assert!(start <= end, "`remove_range()` - range start ({start}) > range end ({end})!");
    assert!(end <= len, "`remove_range()` - range end ({end}) > `len` ({len})!");
    start..end
}
