//! SLinkedList: singly linked sequence over a slot arena.
//!
//! Nodes live in a `SlotMap`; links are generational keys, so unlinking a
//! node can never leave a dangling reference behind and dropping the list
//! releases nodes without walking (or recursing through) the chain.
//!
//! Head operations are O(1), as is `append` via the cached tail. Anything
//! positional walks from the head, including `pop_back`.

use crate::error::Error;
use crate::sequence::{write_braced, Sequence};
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};
use slotmap::{DefaultKey, SlotMap};

struct Node<T> {
    value: T,
    next: Option<DefaultKey>,
}

pub struct SLinkedList<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> SLinkedList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn append(&mut self, value: T) {
        let key = self.nodes.insert(Node { value, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    pub fn prepend(&mut self, value: T) {
        let key = self.nodes.insert(Node {
            value,
            next: self.head,
        });
        if self.tail.is_none() {
            self.tail = Some(key);
        }
        self.head = Some(key);
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|k| &self.nodes[k].value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.map(|k| &self.nodes[k].value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        let node = self.nodes.remove(head)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Some(node.value)
    }

    /// O(n): the predecessor of the tail is found by walking from the head.
    pub fn pop_back(&mut self) -> Option<T> {
        match self.len() {
            0 => None,
            1 => self.pop_front(),
            n => {
                let prev = self.key_at(n - 2);
                self.unlink_after(prev)
            }
        }
    }

    /// Insert `value` so that it ends up at `index`, shifting the former
    /// occupant and everything after it one step toward the tail.
    pub fn insert_at(&mut self, value: T, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        if index == 0 {
            self.prepend(value);
            return Ok(());
        }
        let prev = self.key_at(index - 1);
        let next = self.nodes[prev].next;
        let key = self.nodes.insert(Node { value, next });
        self.nodes[prev].next = Some(key);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, Error> {
        self.check_index(index)?;
        let removed = if index == 0 {
            self.pop_front()
        } else {
            let prev = self.key_at(index - 1);
            self.unlink_after(prev)
        };
        Ok(removed.expect("checked index refers to a live node"))
    }

    pub fn get(&self, index: usize) -> Result<&T, Error> {
        self.check_index(index)?;
        Ok(&self.nodes[self.key_at(index)].value)
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        self.check_index(index)?;
        let key = self.key_at(index);
        Ok(&mut self.nodes[key].value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.len() {
            return Err(Error::out_of_range(index, self.len()));
        }
        Ok(())
    }

    /// Key of the `index`-th node. Callers check `index < len`.
    fn key_at(&self, index: usize) -> DefaultKey {
        let mut key = self.head.expect("non-empty list has a head");
        for _ in 0..index {
            key = self.nodes[key].next.expect("walk stays inside the list");
        }
        key
    }

    fn unlink_after(&mut self, prev: DefaultKey) -> Option<T> {
        let target = self.nodes[prev].next?;
        let node = self.nodes.remove(target)?;
        self.nodes[prev].next = node.next;
        if node.next.is_none() {
            self.tail = Some(prev);
        }
        Some(node.value)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut seen = 0;
        let mut last = None;
        let mut cursor = self.head;
        while let Some(key) = cursor {
            assert!(seen < self.nodes.len(), "cycle in node chain");
            seen += 1;
            last = Some(key);
            cursor = self.nodes[key].next;
        }
        assert_eq!(seen, self.nodes.len(), "unreachable nodes in arena");
        assert_eq!(last, self.tail, "tail does not end the chain");
    }
}

impl<T> Default for SLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SLinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for SLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for SLinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for SLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for SLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_braced(f, self.iter())
    }
}

impl<T> Index<usize> for SLinkedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<usize> for SLinkedList<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> Extend<T> for SLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for SLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Sequence<T> for SLinkedList<T> {
    fn push_back(&mut self, value: T) {
        self.append(value);
    }

    fn pop_front(&mut self) -> Option<T> {
        SLinkedList::pop_front(self)
    }

    fn front(&self) -> Option<&T> {
        SLinkedList::front(self)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Head-to-tail iterator over `&T`.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        let node = &nodes[self.cursor?];
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Owning head-to-tail iterator.
pub struct IntoIter<T> {
    list: SLinkedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for SLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a SLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
