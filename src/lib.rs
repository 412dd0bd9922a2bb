//! Flat sorted containers and a ring-buffer deque for Rust.
//!
//! This crate provides two families of allocator-aware collections:
//!
//! - [`FlatSet`], [`FlatMultiSet`], [`FlatMap`] and [`FlatMultiMap`] keep their elements in a
//!   single contiguous array sorted by key. Lookups are binary searches, iteration is a slice
//!   walk, and insertions accept a position hint that makes sorted or nearly-sorted input cheap.
//! - [`Deque`] is a double-ended queue over a power-of-two ring buffer with O(1) amortized
//!   pushes and pops at both ends and a [`Cursor`](deque::Cursor) that walks the ring in logical
//!   order.
//!
//! # Example
//!
//! ```
//! use flat_collections::{Deque, FlatMap};
//!
//! let mut scores = FlatMap::new();
//! scores.insert("Carol", 92);
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! // Entries are stored contiguously, sorted by key.
//! assert_eq!(scores.as_slice(), &[("Alice", 100), ("Bob", 85), ("Carol", 92)]);
//! assert_eq!(scores.at(&"Bob"), Ok(&85));
//! assert!(scores.at(&"Dave").is_err());
//!
//! let mut queue: Deque<i32> = Deque::new();
//! queue.push_back(2);
//! queue.push_front(1);
//! assert_eq!(queue.iter().copied().collect::<Vec<_>>(), [1, 2]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Allocator aware** - Every container takes an [`Allocator`] and never bypasses it
//! - **Heterogeneous lookup** - Comparators opt in to querying by a borrowed or partial key
//!   through [`Compare`]
//! - **Hinted insertion** - A position hint changes the cost of an insert, never its outcome

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code in order to manage uninitialized ring and array storage.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod raw;

pub mod allocator;
pub mod compare;
pub mod deque;
pub mod error;
pub mod flat_map;
pub mod flat_multimap;
pub mod flat_multiset;
pub mod flat_set;

pub use allocator::{AllocError, Allocator, Global};
pub use compare::{Compare, FnCompare, Natural, Reverse};
pub use deque::Deque;
pub use error::Error;
pub use flat_map::FlatMap;
pub use flat_multimap::FlatMultiMap;
pub use flat_multiset::FlatMultiSet;
pub use flat_set::FlatSet;
