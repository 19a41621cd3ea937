//! DLinkedList: doubly linked sequence over a slot arena.
//!
//! Same surface as [`SLinkedList`](crate::SLinkedList). The back link makes
//! `pop_back` O(1), and positional access walks from whichever end is nearer
//! to the index.

use crate::error::Error;
use crate::sequence::{write_braced, Sequence};
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};
use slotmap::{DefaultKey, SlotMap};

struct Node<T> {
    value: T,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub struct DLinkedList<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<T> DLinkedList<T> {
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
        let key = self.nodes.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    pub fn prepend(&mut self, value: T) {
        let key = self.nodes.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(head) => self.nodes[head].prev = Some(key),
            None => self.tail = Some(key),
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
        Some(self.unlink(head))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        Some(self.unlink(tail))
    }

    /// Insert `value` so that it ends up at `index`; the former occupant
    /// becomes its successor.
    pub fn insert_at(&mut self, value: T, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        let next = self.key_at(index);
        let prev = self.nodes[next].prev;
        let key = self.nodes.insert(Node {
            value,
            prev,
            next: Some(next),
        });
        self.nodes[next].prev = Some(key);
        match prev {
            Some(prev) => self.nodes[prev].next = Some(key),
            None => self.head = Some(key),
        }
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, Error> {
        self.check_index(index)?;
        let key = self.key_at(index);
        Ok(self.unlink(key))
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
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.len() {
            return Err(Error::out_of_range(index, self.len()));
        }
        Ok(())
    }

    /// Key of the `index`-th node, walking from the nearer end. Callers check
    /// `index < len`.
    fn key_at(&self, index: usize) -> DefaultKey {
        let len = self.len();
        if index < len / 2 {
            let mut key = self.head.expect("non-empty list has a head");
            for _ in 0..index {
                key = self.nodes[key].next.expect("walk stays inside the list");
            }
            key
        } else {
            let mut key = self.tail.expect("non-empty list has a tail");
            for _ in index + 1..len {
                key = self.nodes[key].prev.expect("walk stays inside the list");
            }
            key
        }
    }

    fn unlink(&mut self, key: DefaultKey) -> T {
        let node = self.nodes.remove(key).expect("unlinked key is live");
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        node.value
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut seen = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(key) = cursor {
            assert!(seen < self.nodes.len(), "cycle in node chain");
            assert_eq!(self.nodes[key].prev, prev, "back link mismatch at {seen}");
            seen += 1;
            prev = Some(key);
            cursor = self.nodes[key].next;
        }
        assert_eq!(seen, self.nodes.len(), "unreachable nodes in arena");
        assert_eq!(prev, self.tail, "tail does not end the chain");
    }
}

impl<T> Default for DLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DLinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for DLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DLinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for DLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for DLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_braced(f, self.iter())
    }
}

impl<T> Index<usize> for DLinkedList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<usize> for DLinkedList<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> Extend<T> for DLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for DLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Sequence<T> for DLinkedList<T> {
    fn push_back(&mut self, value: T) {
        self.append(value);
    }

    fn pop_front(&mut self) -> Option<T> {
        DLinkedList::pop_front(self)
    }

    fn front(&self) -> Option<&T> {
        DLinkedList::front(self)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Double-ended iterator over `&T`.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Owning double-ended iterator.
pub struct IntoIter<T> {
    list: DLinkedList<T>,
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

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for DLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a DLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
