//! Recoverable errors reported by the collections.
//!
//! Contract violations (an out-of-range hint, indexing past the end, moving a cursor out of
//! bounds) are programmer errors and panic instead.

/// The error type for the fallible operations in this crate.
///
/// # Examples
///
/// ```
/// use flat_collections::{Error, FlatMap};
///
/// let map = FlatMap::from([(1, "a")]);
/// assert_eq!(map.at(&2), Err(Error::KeyNotFound));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A keyed access found no element with an equivalent key.
    #[error("no element found for the given key")]
    KeyNotFound,

    /// A checked positional access was past the end of the container.
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the container at the time of the access.
        len: usize,
    },

    /// The requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator could not satisfy a request.
    #[error("memory allocation of {bytes} bytes failed")]
    ResourceExhausted {
        /// The size of the rejected allocation request.
        bytes: usize,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages() {
        assert_eq!(Error::KeyNotFound.to_string(), "no element found for the given key");
        assert_eq!(
            Error::IndexOutOfBounds {
                index: 4,
                len: 2
            }
            .to_string(),
            "index 4 is out of bounds for length 2"
        );
        assert_eq!(
            Error::ResourceExhausted {
                bytes: 64
            }
            .to_string(),
            "memory allocation of 64 bytes failed"
        );
    }
}
