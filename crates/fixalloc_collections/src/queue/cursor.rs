//! # Queue Cursors and Iterators
//!
//! Read-only cursors follow `next` links front to back. A cursor past the
//! last element is the end cursor; dereferencing it is an error, not UB.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::{LinkedQueue, Node};
use crate::error::{QueueError, QueueResult};

/// A forward-only position within a [`LinkedQueue`].
///
/// Two cursors are equal when they sit on the same node, so every cursor
/// advanced past the back compares equal to [`LinkedQueue::end`].
///
/// # Example
///
/// ```rust
/// use fixalloc_collections::LinkedQueue;
/// use fixalloc_core::Arena;
///
/// let arena = Arena::new(1024);
/// let mut queue = LinkedQueue::new(&arena);
/// queue.try_extend([10, 20, 30])?;
///
/// let mut sum = 0;
/// let mut cursor = queue.begin();
/// while cursor != queue.end() {
///     sum += *cursor.get()?;
///     cursor.advance();
/// }
/// assert_eq!(sum, 60);
/// # Ok::<(), fixalloc_collections::QueueError>(())
/// ```
pub struct Cursor<'q, T> {
    node: Option<NonNull<Node<T>>>,
    _queue: PhantomData<&'q T>,
}

impl<'q, T> Cursor<'q, T> {
    pub(super) const fn new(node: Option<NonNull<Node<T>>>) -> Self {
        Self {
            node,
            _queue: PhantomData,
        }
    }

    /// The element under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EndCursorDereference`] at the end position.
    pub fn get(&self) -> QueueResult<&'q T> {
        // SAFETY: the cursor borrows its queue for 'q, so the node stays
        // alive and unmodified for that long.
        self.node
            .map(|node| unsafe { &(*node.as_ptr()).value })
            .ok_or(QueueError::EndCursorDereference)
    }

    /// Whether the cursor is past the last element.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Moves to the next element; stays put at the end.
    pub fn advance(&mut self) -> &mut Self {
        if let Some(node) = self.node {
            // SAFETY: see `get`.
            self.node = unsafe { (*node.as_ptr()).next };
        }
        self
    }

    /// Moves to the next element and returns the position before the move.
    #[must_use = "use `advance` if the previous position is not needed"]
    pub fn post_advance(&mut self) -> Self {
        let previous = *self;
        self.advance();
        previous
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => f.debug_tuple("Cursor").field(&node).finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

/// Borrowing iterator over a [`LinkedQueue`], front to back.
pub struct Iter<'q, T> {
    next: Option<NonNull<Node<T>>>,
    remaining: usize,
    _queue: PhantomData<&'q T>,
}

impl<T> Iter<'_, T> {
    pub(super) const fn new(head: Option<NonNull<Node<T>>>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            _queue: PhantomData,
        }
    }
}

impl<'q, T> Iterator for Iter<'q, T> {
    type Item = &'q T;

    fn next(&mut self) -> Option<&'q T> {
        let node = self.next?;

        // SAFETY: the iterator borrows its queue for 'q; every node on the
        // chain is live and not mutated meanwhile.
        let node = unsafe { &*node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self::new(self.next, self.remaining)
    }
}

/// Mutable iterator over a [`LinkedQueue`], front to back.
pub struct IterMut<'q, T> {
    next: Option<NonNull<Node<T>>>,
    remaining: usize,
    _queue: PhantomData<&'q mut T>,
}

impl<T> IterMut<'_, T> {
    pub(super) const fn new(head: Option<NonNull<Node<T>>>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            _queue: PhantomData,
        }
    }
}

impl<'q, T> Iterator for IterMut<'q, T> {
    type Item = &'q mut T;

    fn next(&mut self) -> Option<&'q mut T> {
        let node = self.next?;

        // SAFETY: the iterator holds the queue's exclusive borrow and yields
        // each node at most once, so the references never alias.
        let node = unsafe { &mut *node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator that pops elements off a [`LinkedQueue`].
///
/// Each yielded node goes back to the arena immediately.
pub struct IntoIter<'a, T> {
    queue: LinkedQueue<'a, T>,
}

impl<'a, T> IntoIter<'a, T> {
    pub(super) const fn new(queue: LinkedQueue<'a, T>) -> Self {
        Self { queue }
    }
}

impl<T> Iterator for IntoIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.queue.pop() {
            Ok(value) => Some(value),
            Err(QueueError::EmptyQueue) => None,
            Err(err) => {
                tracing::error!(%err, "queue node could not be returned to its arena");
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<'_, T> {}
