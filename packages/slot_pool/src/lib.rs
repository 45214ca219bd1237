#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A growable object pool with stable indices.
//!
//! [`SlotPool`] stores items in index-addressed slots. Removing an item leaves a hole in
//! place instead of shifting later items, so every index handed out stays valid for the
//! item it refers to until that item is removed. Holes are recycled in LIFO order by later
//! insertions.
//!
//! This makes the pool suitable as backing storage for callback registries and similar
//! collections where relative ordering of the surviving items must not change when one of
//! them is removed, and where items are addressed by a stored index.
//!
//! # Example
//!
//! ```
//! use slot_pool::SlotPool;
//!
//! let mut pool = SlotPool::new();
//!
//! let first = pool.insert("a");
//! let second = pool.insert("b");
//! let third = pool.insert("c");
//!
//! // Removing the middle item does not disturb the others.
//! assert_eq!(pool.remove(second), Some("b"));
//! assert_eq!(pool.get(first), Some(&"a"));
//! assert_eq!(pool.get(third), Some(&"c"));
//!
//! // The freed slot is reused by the next insertion.
//! let replacement = pool.insert("d");
//! assert_eq!(replacement.index(), second.index());
//! ```

mod slot_pool;

pub use slot_pool::*;
