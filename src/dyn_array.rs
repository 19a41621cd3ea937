//! DynArray: contiguous growable buffer with percentage-driven resizing.
//!
//! The buffer always holds exactly `capacity` slots. Slots `[0, len)` are
//! live; slots `[len, capacity)` are slack and are never handed out. Whether
//! a slot stores the value itself or an owned box is decided by the element
//! type's [`Element::Storage`], so a reallocation only ever moves slots.
//!
//! Resize policy (all factors are percentages):
//! - Before an append or insert, if `len * 100 >= UPSIZE_THRESHOLD * capacity`
//!   the buffer grows to `max(MINIMUM_SIZE, capacity * GROWTH_FACTOR / 100)`.
//! - Before a removal, if `capacity > MINIMUM_SIZE` and
//!   `len * 100 <= DOWNSIZE_THRESHOLD * capacity` the buffer shrinks to
//!   `max(MINIMUM_SIZE, capacity * SHRINK_FACTOR / 100)`.
//! - Known-size constructors allocate `max(MINIMUM_SIZE, n)` slots.
//!
//! `clear()` is the one operation that leaves the buffer at zero capacity;
//! the next append re-establishes `MINIMUM_SIZE`.

use crate::error::{Error, InvalidArgument};
use crate::sequence::{write_braced, Sequence};
use crate::storage::{Element, Slot, Storage};
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use core::ops::{Index, IndexMut};

/// Smallest capacity kept after any mutation other than `clear`.
pub const MINIMUM_SIZE: usize = 8;
/// Fill percentage at which the next append or insert grows the buffer.
pub const UPSIZE_THRESHOLD: usize = 90;
/// Growth multiplier, in percent.
pub const GROWTH_FACTOR: usize = 200;
/// Fill percentage at which the next removal shrinks the buffer.
pub const DOWNSIZE_THRESHOLD: usize = 55;
/// Shrink multiplier, in percent.
pub const SHRINK_FACTOR: usize = 70;

#[inline]
fn vacant<T: Element>() -> Slot<T> {
    <T::Storage as Storage<T>>::vacant()
}

#[inline]
fn store<T: Element>(value: T) -> Slot<T> {
    <T::Storage as Storage<T>>::occupy(value)
}

#[inline]
fn load<T: Element>(slot: &Slot<T>) -> &T {
    <T::Storage as Storage<T>>::get(slot).expect("slots below len are occupied")
}

#[inline]
fn load_mut<T: Element>(slot: &mut Slot<T>) -> &mut T {
    <T::Storage as Storage<T>>::get_mut(slot).expect("slots below len are occupied")
}

#[inline]
fn take<T: Element>(slot: &mut Slot<T>) -> T {
    <T::Storage as Storage<T>>::vacate(slot).expect("slots below len are occupied")
}

#[inline]
fn unwrap_slot<T: Element>(slot: Slot<T>) -> T {
    <T::Storage as Storage<T>>::release(slot).expect("slots below len are occupied")
}

/// Positionally indexed sequence with amortized O(1) append.
pub struct DynArray<T: Element> {
    slots: Box<[Slot<T>]>,
    len: usize,
}

impl<T: Element> DynArray<T> {
    /// Empty array with `MINIMUM_SIZE` slots.
    pub fn new() -> Self {
        Self::with_slots(MINIMUM_SIZE)
    }

    fn with_slots(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, vacant::<T>);
        Self {
            slots: slots.into_boxed_slice(),
            len: 0,
        }
    }

    /// Build from a sequence of known length `n`, allocating
    /// `max(MINIMUM_SIZE, n)` slots up front.
    pub fn from_exact<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator<Item = T>,
    {
        let items = items.into_iter();
        let mut out = Self::with_slots(items.len().max(MINIMUM_SIZE));
        for value in items {
            // An iterator that under-reports its length still lands safely.
            if out.len == out.capacity() {
                out.grow_if_full();
            }
            out.slots[out.len] = store(value);
            out.len += 1;
        }
        out
    }

    /// `n` default-valued elements.
    pub fn with_default_len(n: usize) -> Self
    where
        T: Default,
    {
        Self::from_exact((0..n).map(|_| T::default()))
    }

    #[doc(alias = "size")]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, live and slack.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// True when elements are stored inline rather than behind a box.
    pub fn is_dense() -> bool {
        <T::Storage as Storage<T>>::DENSE
    }

    pub fn append(&mut self, value: T) {
        self.grow_if_full();
        self.slots[self.len] = store(value);
        self.len += 1;
    }

    /// Insert `value` at `index`, shifting `[index, len)` one slot toward
    /// the tail. Requires `index < len`.
    pub fn insert_at(&mut self, value: T, index: usize) -> Result<(), Error> {
        if index >= self.len {
            return Err(Error::out_of_range(index, self.len));
        }
        self.grow_if_full();
        // Slot `len` is slack; rotating brings it to `index`.
        self.slots[index..=self.len].rotate_right(1);
        self.slots[index] = store(value);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at `index`, shifting `(index, len)` one
    /// slot toward the head.
    pub fn remove_at(&mut self, index: usize) -> Result<T, Error> {
        if index >= self.len {
            return Err(Error::out_of_range(index, self.len));
        }
        self.shrink_if_sparse();
        let value = take::<T>(&mut self.slots[index]);
        self.slots[index..self.len].rotate_left(1);
        self.len -= 1;
        Ok(value)
    }

    pub fn get(&self, index: usize) -> Result<&T, Error> {
        match self.slots[..self.len].get(index) {
            Some(slot) => Ok(load::<T>(slot)),
            None => Err(Error::out_of_range(index, self.len)),
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len;
        match self.slots[..len].get_mut(index) {
            Some(slot) => Ok(load_mut::<T>(slot)),
            None => Err(Error::out_of_range(index, len)),
        }
    }

    /// Overwrite the element at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, Error> {
        let current = self.get_mut(index)?;
        Ok(mem::replace(current, value))
    }

    pub fn first(&self) -> Option<&T> {
        self.slots[..self.len].first().map(load::<T>)
    }

    pub fn last(&self) -> Option<&T> {
        self.slots[..self.len].last().map(load::<T>)
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Reallocate so the array holds exactly `new_size` elements.
    ///
    /// Positions past the old length are filled with `T::default()`.
    /// Shrinking below the live length drops the tail and must be allowed
    /// explicitly with `allow_shrink`. The buffer itself never goes below
    /// `MINIMUM_SIZE` slots.
    pub fn resize(&mut self, new_size: usize, allow_shrink: bool) -> Result<(), Error>
    where
        T: Default,
    {
        if new_size == 0 {
            return Err(InvalidArgument::ZeroSize.into());
        }
        if new_size < self.len && !allow_shrink {
            return Err(InvalidArgument::WouldTruncate {
                requested: new_size,
                len: self.len,
            }
            .into());
        }
        self.truncate(new_size);
        self.reallocate(new_size.max(MINIMUM_SIZE));
        while self.len < new_size {
            self.slots[self.len] = store(T::default());
            self.len += 1;
        }
        Ok(())
    }

    /// Release every element and the buffer itself.
    pub fn clear(&mut self) {
        self.slots = Box::default();
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots[..self.len].iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.slots[..self.len].iter_mut(),
        }
    }

    fn truncate(&mut self, new_len: usize) {
        while self.len > new_len {
            self.len -= 1;
            drop(<T::Storage as Storage<T>>::vacate(&mut self.slots[self.len]));
        }
    }

    fn grow_if_full(&mut self) {
        let capacity = self.capacity();
        if self.len * 100 >= UPSIZE_THRESHOLD * capacity {
            self.reallocate((capacity * GROWTH_FACTOR / 100).max(MINIMUM_SIZE));
        }
    }

    fn shrink_if_sparse(&mut self) {
        let capacity = self.capacity();
        if capacity > MINIMUM_SIZE && self.len * 100 <= DOWNSIZE_THRESHOLD * capacity {
            self.reallocate((capacity * SHRINK_FACTOR / 100).max(MINIMUM_SIZE));
        }
    }

    /// Move the live prefix into a fresh buffer of `new_capacity` slots.
    /// Live slots past the new capacity are released.
    fn reallocate(&mut self, new_capacity: usize) {
        let keep = self.len.min(new_capacity);
        let old = mem::take(&mut self.slots).into_vec();
        let mut fresh = Vec::with_capacity(new_capacity);
        fresh.extend(old.into_iter().take(keep));
        fresh.resize_with(new_capacity, vacant::<T>);
        self.slots = fresh.into_boxed_slice();
        self.len = keep;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let capacity = self.capacity();
        assert!(self.len <= capacity, "len {} exceeds capacity {}", self.len, capacity);
        if capacity == 0 {
            assert_eq!(self.len, 0);
        } else {
            assert!(capacity >= MINIMUM_SIZE, "capacity {capacity} below floor");
        }
        for (i, slot) in self.slots.iter().enumerate() {
            let occupied = <T::Storage as Storage<T>>::get(slot).is_some();
            if i < self.len {
                assert!(occupied, "live slot {i} is empty");
            } else if !Self::is_dense() {
                assert!(!occupied, "slack slot {i} still owns a value");
            }
        }
    }
}

impl<T: Element> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element + Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_slots(self.capacity());
        for (slot, value) in out.slots.iter_mut().zip(self.iter()) {
            *slot = store(value.clone());
        }
        out.len = self.len;
        out
    }
}

impl<T: Element + PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Element + Eq> Eq for DynArray<T> {}

impl<T: Element + fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders `{ e1, e2, ... }`, or `{ }` when empty.
impl<T: Element + fmt::Display> fmt::Display for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_braced(f, self.iter())
    }
}

impl<T: Element> Index<usize> for DynArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Element> IndexMut<usize> for DynArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Element> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T: Element> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_exact(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Element> From<Vec<T>> for DynArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_exact(values)
    }
}

impl<T: Element, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(values: [T; N]) -> Self {
        Self::from_exact(values)
    }
}

impl<T: Element> Sequence<T> for DynArray<T> {
    fn push_back(&mut self, value: T) {
        self.append(value);
    }

    fn pop_front(&mut self) -> Option<T> {
        self.remove_at(0).ok()
    }

    fn front(&self) -> Option<&T> {
        self.first()
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Build a [`DynArray`] from a literal list of elements.
///
/// ```
/// use chained_collections::dyn_array;
///
/// let a = dyn_array![1, 2, 3];
/// assert_eq!(a.len(), 3);
/// assert_eq!(a.capacity(), 8);
/// ```
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::DynArray::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::DynArray::from([$($value),+])
    };
}

/// Borrowing iterator over the live prefix, in index order.
pub struct Iter<'a, T: Element + 'a> {
    inner: core::slice::Iter<'a, Slot<T>>,
}

impl<'a, T: Element + 'a> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T: Element + 'a> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(load::<T>)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Element + 'a> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(load::<T>)
    }
}

impl<'a, T: Element + 'a> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T: Element + 'a> FusedIterator for Iter<'a, T> {}

/// Mutable iterator over the live prefix.
pub struct IterMut<'a, T: Element + 'a> {
    inner: core::slice::IterMut<'a, Slot<T>>,
}

impl<'a, T: Element + 'a> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        self.inner.next().map(load_mut::<T>)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Element + 'a> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        self.inner.next_back().map(load_mut::<T>)
    }
}

impl<'a, T: Element + 'a> ExactSizeIterator for IterMut<'a, T> {}
impl<'a, T: Element + 'a> FusedIterator for IterMut<'a, T> {}

/// Owning iterator; slack slots are dropped up front.
pub struct IntoIter<T: Element> {
    inner: std::vec::IntoIter<Slot<T>>,
}

impl<T: Element> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.next().map(unwrap_slot::<T>)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Element> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(unwrap_slot::<T>)
    }
}

impl<T: Element> ExactSizeIterator for IntoIter<T> {}
impl<T: Element> FusedIterator for IntoIter<T> {}

impl<T: Element> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let DynArray { slots, len } = self;
        let mut slots = slots.into_vec();
        slots.truncate(len);
        IntoIter {
            inner: slots.into_iter(),
        }
    }
}

impl<'a, T: Element> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T: Element> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Scenario: append three, remove the head, insert it back at the front.
    #[test]
    fn append_remove_insert_round_trip() {
        let mut a = DynArray::new();
        a.append(1);
        a.append(2);
        a.append(3);
        assert_eq!(a.len(), 3);
        assert_eq!((a[0], a[1], a[2]), (1, 2, 3));

        assert_eq!(a.remove_at(0), Ok(1));
        assert_eq!(a, dyn_array![2, 3]);

        a.insert_at(1, 0).unwrap();
        assert_eq!(a, dyn_array![1, 2, 3]);
        a.debug_validate_invariants();
    }

    /// Invariant: new arrays start at the floor capacity with no live slots.
    #[test]
    fn new_starts_at_minimum_size() {
        let a: DynArray<u8> = DynArray::new();
        assert_eq!(a.capacity(), MINIMUM_SIZE);
        assert!(a.is_empty());
        a.debug_validate_invariants();
    }

    /// Invariant: the next append after reaching the upsize threshold doubles
    /// the capacity; below the threshold capacity is unchanged.
    #[test]
    fn growth_triggers_at_upsize_threshold() {
        let mut a = DynArray::new();
        for i in 0..8 {
            a.append(i);
        }
        assert_eq!(a.capacity(), 8, "7/8 < 90% so the 8th append fits");
        a.append(8);
        assert_eq!(a.capacity(), 16);

        for i in 9..15 {
            a.append(i);
        }
        assert_eq!(a.len(), 15);
        assert_eq!(a.capacity(), 16);
        a.append(15);
        assert_eq!(a.capacity(), 32);
        a.debug_validate_invariants();
    }

    /// Invariant: insert_at shares append's growth check.
    #[test]
    fn insert_at_grows_full_buffer() {
        let mut a: DynArray<i32> = (0..8).collect();
        assert_eq!(a.capacity(), 8);
        a.insert_at(-1, 4).unwrap();
        assert_eq!(a.capacity(), 16);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, -1, 4, 5, 6, 7]);
    }

    /// Invariant: removals shrink by SHRINK_FACTOR once fill drops to the
    /// downsize threshold, and never below MINIMUM_SIZE.
    #[test]
    fn shrink_triggers_at_downsize_threshold_and_respects_floor() {
        let mut a = DynArray::new();
        for i in 0..16 {
            a.append(i);
        }
        assert_eq!(a.capacity(), 32);

        // 16 of 32 is at most 55%: the removal shrinks to 22 first.
        a.remove_at(0).unwrap();
        assert_eq!(a.capacity(), 22);
        assert_eq!(a.len(), 15);

        let mut seen = vec![a.capacity()];
        while !a.is_empty() {
            a.remove_at(0).unwrap();
            if seen.last() != Some(&a.capacity()) {
                seen.push(a.capacity());
            }
            assert!(a.capacity() >= MINIMUM_SIZE);
            a.debug_validate_invariants();
        }
        assert_eq!(seen, vec![22, 15, 10, 8]);
    }

    /// Invariant: removing every element from the head yields them in
    /// original order and leaves the array empty.
    #[test]
    fn drain_from_head_preserves_order() {
        let mut a: DynArray<u32> = (0..100).collect();
        let mut out = Vec::new();
        while !a.is_empty() {
            out.push(a.remove_at(0).unwrap());
        }
        assert_eq!(out, (0..100).collect::<Vec<_>>());
        assert!(a.is_empty());
        assert_eq!(a.capacity(), MINIMUM_SIZE);
    }

    /// Invariant: out-of-range positional operations report index and length
    /// and leave the array untouched.
    #[test]
    fn out_of_range_is_reported_not_clamped() {
        let mut a = dyn_array![10, 20];
        assert_eq!(a.get(2), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(a.get_mut(5).err(), Some(Error::OutOfRange { index: 5, len: 2 }));
        assert_eq!(a.set(2, 0), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(a.remove_at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(a.insert_at(0, 2), Err(Error::OutOfRange { index: 2, len: 2 }));
        assert_eq!(a, dyn_array![10, 20]);

        let mut empty: DynArray<i32> = DynArray::new();
        assert_eq!(empty.insert_at(1, 0), Err(Error::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    #[should_panic(expected = "index out of bounds: index 3, size 1")]
    fn index_operator_panics_with_error_message() {
        let a = dyn_array![1];
        let _v = a[3];
    }

    /// Invariant: resize rejects zero and silent truncation.
    #[test]
    fn resize_argument_validation() {
        let mut a = dyn_array![1, 2, 3];
        assert_eq!(
            a.resize(0, true),
            Err(Error::InvalidArgument(InvalidArgument::ZeroSize))
        );
        assert_eq!(
            a.resize(2, false),
            Err(Error::InvalidArgument(InvalidArgument::WouldTruncate {
                requested: 2,
                len: 3
            }))
        );
        assert_eq!(a, dyn_array![1, 2, 3]);
    }

    /// Invariant: shrinking then growing back restores the length but not the
    /// dropped data; positions past the cut come back as defaults.
    #[test]
    fn resize_round_trip_is_lossy() {
        let mut a: DynArray<i32> = (1..=20).collect();
        a.resize(5, true).unwrap();
        assert_eq!(a, dyn_array![1, 2, 3, 4, 5]);
        assert_eq!(a.capacity(), MINIMUM_SIZE);

        a.resize(20, true).unwrap();
        assert_eq!(a.len(), 20);
        assert_eq!(a.capacity(), 20);
        let expected: Vec<i32> = (1..=5).chain(core::iter::repeat(0).take(15)).collect();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), expected);
        a.debug_validate_invariants();

        // The next append still follows the growth policy.
        a.append(21);
        assert_eq!(a.capacity(), 40);
    }

    /// Invariant: clear drops to zero capacity; the next append restores the floor.
    #[test]
    fn clear_then_append_reestablishes_floor() {
        let mut a = dyn_array!["a".to_string(), "b".to_string()];
        a.clear();
        assert_eq!(a.capacity(), 0);
        assert!(a.is_empty());
        assert!(a.remove_at(0).is_err());
        a.debug_validate_invariants();

        a.append("c".to_string());
        assert_eq!(a.capacity(), MINIMUM_SIZE);
        assert_eq!(a[0], "c");
    }

    /// Invariant: known-size construction never allocates fewer slots than
    /// elements.
    #[test]
    fn known_size_construction_fits_all_elements() {
        let a: DynArray<u32> = DynArray::from_exact(0..100u32);
        assert_eq!(a.len(), 100);
        assert_eq!(a.capacity(), 100);

        let small = DynArray::from([1u8, 2, 3]);
        assert_eq!(small.capacity(), MINIMUM_SIZE);

        let d: DynArray<String> = DynArray::with_default_len(3);
        assert_eq!(d.len(), 3);
        assert!(d.iter().all(String::is_empty));
    }

    /// Invariant: scalars use dense storage, composites use indirect storage.
    #[test]
    fn storage_strategy_follows_element_kind() {
        assert!(DynArray::<i32>::is_dense());
        assert!(DynArray::<f64>::is_dense());
        assert!(!DynArray::<String>::is_dense());
        assert!(!DynArray::<DynArray<i32>>::is_dense());
    }

    /// Invariant: in indirect mode a reallocation moves handles, so element
    /// addresses survive growth and shrink.
    #[test]
    fn indirect_elements_do_not_move_on_reallocation() {
        let mut a = DynArray::new();
        a.append("first".to_string());
        let before: *const String = &a[0];
        for i in 0..50 {
            a.append(i.to_string());
        }
        assert!(a.capacity() > MINIMUM_SIZE);
        assert!(core::ptr::eq(before, &a[0]));

        while a.len() > 1 {
            a.remove_at(1).unwrap();
        }
        assert!(core::ptr::eq(before, &a[0]));
    }

    /// Invariant: every owned element is released exactly once across
    /// removals, truncating resizes, clear and drop.
    #[test]
    fn indirect_elements_are_released_exactly_once() {
        struct Tracked(Rc<Cell<usize>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        impl Element for Tracked {
            type Storage = crate::Boxed;
        }

        let drops = Rc::new(Cell::new(0));
        let mut a = DynArray::new();
        for _ in 0..20 {
            a.append(Tracked(drops.clone()));
        }
        drop(a.remove_at(3).unwrap());
        assert_eq!(drops.get(), 1);

        a.truncate(10);
        assert_eq!(drops.get(), 10);

        a.clear();
        assert_eq!(drops.get(), 20);

        for _ in 0..4 {
            a.append(Tracked(drops.clone()));
        }
        drop(a);
        assert_eq!(drops.get(), 24);
    }

    /// Nested arrays behave like any other composite element.
    #[test]
    fn nested_arrays() {
        let e1 = dyn_array![1, 2, 3];
        let e2 = dyn_array![4, 5, 6];
        let e3 = dyn_array![7, 8, 9];
        let mut outer = DynArray::new();
        outer.append(e1.clone());
        outer.append(e2.clone());
        outer.append(e3.clone());
        assert_eq!(outer.len(), 3);
        assert_eq!(outer[1], e2);

        assert_eq!(outer.remove_at(1).unwrap(), e2);
        outer.insert_at(e2.clone(), 1).unwrap();
        assert_eq!(outer, dyn_array![e1.clone(), e2.clone(), e3.clone()]);

        outer[0][0] = 10;
        assert_eq!(outer[0], dyn_array![10, 2, 3]);
        assert_ne!(outer[0], e1);

        outer.resize(2, true).unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer[1], e2);
    }

    /// Invariant: clones are deep and independent, with the same capacity.
    #[test]
    fn clone_is_deep() {
        let mut a: DynArray<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.capacity(), b.capacity());
        a[0].push('!');
        assert_ne!(a, b);
        assert_eq!(b[0], "x");
    }

    /// Invariant: equality compares length and elements in order only.
    #[test]
    fn equality_ignores_capacity() {
        let mut a: DynArray<i32> = (0..16).collect();
        a.remove_at(15).unwrap();
        a.remove_at(14).unwrap();
        let b: DynArray<i32> = (0..14).collect();
        assert_eq!((a.capacity(), b.capacity()), (16, 14));
        assert_eq!(a, b);

        let mut reversed = b.clone();
        reversed.set(0, 1).unwrap();
        reversed.set(1, 0).unwrap();
        assert_ne!(a, reversed);
        assert_ne!(dyn_array![0, 1], dyn_array![0, 1, 2]);
    }

    #[test]
    fn display_and_debug_render_live_elements() {
        let a = dyn_array![1, 2, 3];
        assert_eq!(a.to_string(), "{ 1, 2, 3 }");
        assert_eq!(format!("{a:?}"), "[1, 2, 3]");
        let e: DynArray<i32> = DynArray::new();
        assert_eq!(e.to_string(), "{ }");
    }

    /// Invariant: iteration is restartable and symmetric in both directions.
    #[test]
    fn iteration_forward_reverse_and_mutable() {
        let mut a: DynArray<i32> = (1..=5).collect();
        let it = a.iter();
        let again = it.clone();
        assert_eq!(it.copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(again.rev().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
        assert_eq!(a.iter().len(), 5);

        for v in a.iter_mut() {
            *v *= 10;
        }
        for v in &mut a {
            *v += 1;
        }
        assert_eq!((&a).into_iter().copied().collect::<Vec<_>>(), vec![11, 21, 31, 41, 51]);
        assert_eq!(a.into_iter().rev().collect::<Vec<_>>(), vec![51, 41, 31, 21, 11]);
    }

    #[test]
    fn set_first_last_contains() {
        let mut a = dyn_array!['a', 'b', 'c'];
        assert_eq!(a.set(1, 'z'), Ok('b'));
        assert_eq!(a.first(), Some(&'a'));
        assert_eq!(a.last(), Some(&'c'));
        assert!(a.contains(&'z'));
        assert!(!a.contains(&'b'));
        let e: DynArray<char> = DynArray::new();
        assert_eq!(e.first(), None);
    }

    #[test]
    fn sequence_contract_is_fifo() {
        let mut a: DynArray<i32> = DynArray::new();
        Sequence::push_back(&mut a, 1);
        Sequence::push_back(&mut a, 2);
        assert_eq!(Sequence::front(&a), Some(&1));
        assert_eq!(Sequence::pop_front(&mut a), Some(1));
        assert_eq!(Sequence::pop_front(&mut a), Some(2));
        assert_eq!(Sequence::pop_front(&mut a), None);
        assert!(Sequence::is_empty(&a));
    }
}
