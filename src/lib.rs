//! chained-collections: a small family of owned, single-threaded containers
//! with explicit, percentage-driven growth policies.
//!
//! Internal Design:
//!
//! Summary
//! - Containers:
//!   - DynArray<T>: contiguous growable array. The slot representation is
//!     picked per element type (`Element::Storage`): scalars live inline,
//!     everything else behind an owned box, so reallocation never clones
//!     or default-constructs payloads.
//!   - ChainedHashMap<K, V, S>: separate-chaining map whose growth is
//!     triggered by a clustering load factor (`Σ chain_len² / buckets`)
//!     rather than plain occupancy.
//!   - SLinkedList<T>, DLinkedList<T>: arena-backed linked sequences.
//!   - Stack<T>, Queue<T, L>: adapters over the lists; `Queue` accepts any
//!     `Sequence`.
//!
//! Constraints
//! - Single-threaded; no interior locking.
//! - Every container exclusively owns its elements. Removal and clearing
//!   hand values back or drop them exactly once.
//! - Positional access is strict: indices outside `[0, len)` fail with
//!   `Error::OutOfRange` (or panic through `Index`). Key removal on the map
//!   is lenient.
//! - Resize thresholds are compile-time constants exported below.
//!
//! Drop and recursion
//! - Map chains are owned `Box` links and are released front to back.
//!   List nodes live in a `SlotMap`, so no container recurses on drop
//!   regardless of length.
//!
//! Reentrancy
//! - The map only calls user code (`K: Hash`, `K: Eq`) while probing, before
//!   any structural change. Rehashing uses the hash cached in each entry.
//! - Probes may nest, so a key's `Eq` may read the map. Debug builds panic if
//!   a chain is relinked while a probe is open.
//!
//! Checking invariants
//! - Each container has `debug_validate_invariants()` in test and
//!   debug builds; the property tests call it after every step.
//!
//! Notes and non-goals
//! - No internal locking: containers are `Send` when their elements are, and
//!   are shared across threads only behind the caller's own lock.
//! - No serialization, no balanced trees.
//! - No logging: failures surface as `Result`/`Option` values or as
//!   panics on `Index`.

mod chained_map;
mod chained_map_proptest;
mod dlinked_list;
mod dyn_array;
mod dyn_array_proptest;
mod error;
mod probe_guard;
mod queue;
mod sequence;
mod slinked_list;
mod stack;
mod storage;

// Public surface
pub use chained_map::{ChainedHashMap, DEFAULT_BUCKETS, MAX_LOAD, NEW_LOAD};
pub use dlinked_list::DLinkedList;
pub use dyn_array::{
    DynArray, DOWNSIZE_THRESHOLD, GROWTH_FACTOR, MINIMUM_SIZE, SHRINK_FACTOR, UPSIZE_THRESHOLD,
};
pub use error::{Error, InvalidArgument};
pub use queue::Queue;
pub use sequence::Sequence;
pub use slinked_list::SLinkedList;
pub use stack::Stack;
pub use storage::{Boxed, Element, Inline, Slot, Storage};

/// Iterator types, named for use in signatures.
pub mod iter {
    pub use crate::chained_map::{IntoIter as MapIntoIter, Iter as MapIter, IterMut as MapIterMut};
    pub use crate::dlinked_list::{IntoIter as DListIntoIter, Iter as DListIter};
    pub use crate::dyn_array::{IntoIter, Iter, IterMut};
    pub use crate::slinked_list::{IntoIter as SListIntoIter, Iter as SListIter};
}
