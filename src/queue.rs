//! FIFO adapter over any [`Sequence`]. Defaults to a [`DLinkedList`] so both
//! ends are O(1).

use crate::dlinked_list::DLinkedList;
use crate::sequence::Sequence;
use core::marker::PhantomData;

pub struct Queue<T, L = DLinkedList<T>> {
    inner: L,
    _marker: PhantomData<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self::with_sequence(DLinkedList::new())
    }
}

impl<T, L: Sequence<T>> Queue<T, L> {
    /// Queue over `inner`; existing elements stay in front of anything
    /// pushed later.
    pub fn with_sequence(inner: L) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    pub fn push(&mut self, value: T) {
        self.inner.push_back(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.inner.front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        while self.inner.pop_front().is_some() {}
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<T, L: Sequence<T> + Default> Default for Queue<T, L> {
    fn default() -> Self {
        Self::with_sequence(L::default())
    }
}

impl<T, L: Clone> Clone for Queue<T, L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, L: core::fmt::Debug> core::fmt::Debug for Queue<T, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Queue").field(&self.inner).finish()
    }
}
