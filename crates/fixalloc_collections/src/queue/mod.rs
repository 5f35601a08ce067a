//! # Linked Queue
//!
//! A singly-linked FIFO whose nodes live in [`Arena`] storage.
//!
//! ## Safety Note
//!
//! Nodes are constructed in place inside arena regions and linked by raw
//! pointers, so this module requires unsafe code. Every node reachable from
//! `head` was written by `push`, belongs to `self.arena`, and is read out
//! exactly once, by `pop`.
//!
//! ## Layout
//!
//! ```text
//!   head                              tail
//!    │                                 │
//!    ▼                                 ▼
//!  ┌──────┬────┐   ┌──────┬────┐   ┌──────┬────┐
//!  │  v1  │next├──►│  v2  │next├──►│  v3  │None│    (arena regions)
//!  └──────┴────┘   └──────┴────┘   └──────┴────┘
//! ```

#![allow(unsafe_code)]

mod cursor;

pub use cursor::{Cursor, IntoIter, Iter, IterMut};

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use fixalloc_core::Arena;

use crate::error::{QueueError, QueueResult};

/// One link of the chain.
struct Node<T> {
    value: T,
    next: Option<NonNull<Node<T>>>,
}

impl<T> Node<T> {
    /// Size and alignment requested from the arena per node.
    const LAYOUT: Layout = Layout::new::<Self>();
}

/// A FIFO queue drawing every node from a borrowed [`Arena`].
///
/// Each `push` allocates one node from the arena and each `pop` returns it,
/// so a queue that is drained and refilled reuses the same regions and the
/// arena's cursor does not move.
///
/// # Type Parameters
///
/// * `T` - The element type
///
/// # Example
///
/// ```rust
/// use fixalloc_collections::LinkedQueue;
/// use fixalloc_core::Arena;
///
/// let arena = Arena::new(1024);
/// let mut queue = LinkedQueue::new(&arena);
///
/// queue.push(10)?;
/// queue.push(20)?;
/// assert_eq!(*queue.front()?, 10);
/// assert_eq!(queue.pop()?, 10);
/// assert_eq!(queue.len(), 1);
/// # Ok::<(), fixalloc_collections::QueueError>(())
/// ```
pub struct LinkedQueue<'a, T> {
    /// First node; popped next.
    head: Option<NonNull<Node<T>>>,
    /// Last node; appended after.
    tail: Option<NonNull<Node<T>>>,
    /// Number of nodes in the chain.
    len: usize,
    /// Source of all node storage.
    arena: &'a Arena,
    /// The queue owns its nodes and their payloads.
    _owns: PhantomData<Box<Node<T>>>,
}

impl<'a, T> LinkedQueue<'a, T> {
    /// Creates an empty queue that allocates from `arena`.
    #[must_use]
    pub const fn new(arena: &'a Arena) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            arena,
            _owns: PhantomData,
        }
    }

    /// The arena this queue draws from.
    #[inline]
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the queue holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value` at the back.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Alloc`] carrying the arena's
    /// [`OutOfMemory`](fixalloc_core::AllocError::OutOfMemory) when no node
    /// storage is left. The queue is unchanged and `value` is dropped.
    pub fn push(&mut self, value: T) -> QueueResult<()> {
        let node = self.arena.allocate_layout(Node::<T>::LAYOUT)?.cast::<Node<T>>();

        // SAFETY: the arena just handed out this region, sized and aligned
        // for Node<T>, and nothing else refers to it.
        unsafe { node.as_ptr().write(Node { value, next: None }) };

        self.link_back(node);
        Ok(())
    }

    /// Appends a clone of `value` at the back.
    ///
    /// Leaves the queue in the same state as `push(value.clone())`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::push`].
    pub fn push_cloned(&mut self, value: &T) -> QueueResult<()>
    where
        T: Clone,
    {
        self.push(value.clone())
    }

    /// Appends every item of `iter`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Same as [`Self::push`]; items pushed before the failure stay queued.
    pub fn try_extend<I>(&mut self, iter: I) -> QueueResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    /// Removes the front element and returns it.
    ///
    /// The node's storage goes back to the arena.
    ///
    /// # Errors
    ///
    /// - [`QueueError::EmptyQueue`] if the queue is empty
    /// - [`QueueError::Alloc`] if the arena refuses the node; this means the
    ///   arena was reset underneath the queue
    pub fn pop(&mut self) -> QueueResult<T> {
        let node = self.unlink_front().ok_or(QueueError::EmptyQueue)?;

        // SAFETY: the node was initialised by `push` and is no longer
        // reachable from the chain, so this moves out the only copy.
        let Node { value, .. } = unsafe { node.as_ptr().read() };

        self.arena.release_layout(node.cast(), Node::<T>::LAYOUT)?;
        Ok(value)
    }

    /// Reference to the front element.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if the queue is empty.
    pub fn front(&self) -> QueueResult<&T> {
        // SAFETY: head is a live node; the shared borrow of self rules out
        // mutation while the reference exists.
        self.head
            .map(|node| unsafe { &(*node.as_ptr()).value })
            .ok_or(QueueError::EmptyQueue)
    }

    /// Mutable reference to the front element.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if the queue is empty.
    pub fn front_mut(&mut self) -> QueueResult<&mut T> {
        // SAFETY: head is a live node; the exclusive borrow of self makes
        // this the only reference into the chain.
        self.head
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
            .ok_or(QueueError::EmptyQueue)
    }

    /// Reference to the back element.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if the queue is empty.
    pub fn back(&self) -> QueueResult<&T> {
        // SAFETY: as in `front`, for the tail node.
        self.tail
            .map(|node| unsafe { &(*node.as_ptr()).value })
            .ok_or(QueueError::EmptyQueue)
    }

    /// Mutable reference to the back element.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::EmptyQueue`] if the queue is empty.
    pub fn back_mut(&mut self) -> QueueResult<&mut T> {
        // SAFETY: as in `front_mut`, for the tail node.
        self.tail
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
            .ok_or(QueueError::EmptyQueue)
    }

    /// Pops until empty.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::pop`] other than `EmptyQueue`.
    pub fn clear(&mut self) -> QueueResult<()> {
        while !self.is_empty() {
            self.pop()?;
        }
        Ok(())
    }

    /// Deep copy on the same arena as `self`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Alloc`] if the arena runs out part way; the
    /// partial copy is dropped and its nodes returned.
    pub fn try_clone(&self) -> QueueResult<Self>
    where
        T: Clone,
    {
        let mut copy = Self::new(self.arena);
        copy.try_extend(self.iter().cloned())?;
        Ok(copy)
    }

    /// Replaces the contents with clones of `source`'s elements.
    ///
    /// The new nodes come from `self`'s own arena.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_clone`]; on failure `self` holds a prefix of
    /// `source`.
    pub fn try_clone_from(&mut self, source: &LinkedQueue<'_, T>) -> QueueResult<()>
    where
        T: Clone,
    {
        self.clear()?;
        self.try_extend(source.iter().cloned())
    }

    /// Moves the whole chain into a new queue on the same arena, in O(1).
    ///
    /// `self` is left empty.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::new(self.arena))
    }

    /// Replaces the contents with `source`'s elements, leaving `source` empty.
    ///
    /// `self` keeps drawing from its own arena. When both queues share an
    /// arena the chain is relinked in O(1); otherwise each element is popped
    /// from `source` and pushed into `self` so every node stays with the
    /// arena that allocated it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Alloc`] if `self`'s arena runs out during an
    /// element-wise move. Elements moved so far stay in `self`, every other
    /// element stays in `source`; nothing is dropped.
    pub fn move_from(&mut self, source: &mut LinkedQueue<'_, T>) -> QueueResult<()> {
        self.clear()?;

        if self.arena == source.arena {
            self.head = source.head.take();
            self.tail = source.tail.take();
            self.len = std::mem::take(&mut source.len);
            return Ok(());
        }

        while !source.is_empty() {
            // Reserve the destination node first so running out of memory
            // leaves the element in `source`.
            let node = self.arena.allocate_layout(Node::<T>::LAYOUT)?.cast::<Node<T>>();
            let value = match source.pop() {
                Ok(value) => value,
                Err(err) => {
                    self.arena.release_layout(node.cast(), Node::<T>::LAYOUT)?;
                    return Err(err);
                }
            };

            // SAFETY: fresh region sized and aligned for Node<T>, as in `push`.
            unsafe { node.as_ptr().write(Node { value, next: None }) };
            self.link_back(node);
        }
        Ok(())
    }

    /// Cursor at the front element (equal to [`Self::end`] when empty).
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.head)
    }

    /// Cursor one past the back element.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(None)
    }

    /// Iterates front to back.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.head, self.len)
    }

    /// Iterates front to back, yielding mutable references.
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.head, self.len)
    }

    fn link_back(&mut self, node: NonNull<Node<T>>) {
        match self.tail {
            // SAFETY: tail is a live node of this chain and self is borrowed
            // exclusively.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    fn unlink_front(&mut self) -> Option<NonNull<Node<T>>> {
        let head = self.head?;

        // SAFETY: head is a live node of this chain.
        self.head = unsafe { (*head.as_ptr()).next };
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(head)
    }
}

impl<T> Drop for LinkedQueue<'_, T> {
    fn drop(&mut self) {
        while !self.is_empty() {
            if let Err(err) = self.pop() {
                tracing::error!(%err, "queue node could not be returned to its arena");
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedQueue<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Element-wise equality; the arenas involved do not matter.
impl<'b, T: PartialEq> PartialEq<LinkedQueue<'b, T>> for LinkedQueue<'_, T> {
    fn eq(&self, other: &LinkedQueue<'b, T>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedQueue<'_, T> {}

impl<'q, T> IntoIterator for &'q LinkedQueue<'_, T> {
    type Item = &'q T;
    type IntoIter = Iter<'q, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'q, T> IntoIterator for &'q mut LinkedQueue<'_, T> {
    type Item = &'q mut T;
    type IntoIter = IterMut<'q, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, T> IntoIterator for LinkedQueue<'a, T> {
    type Item = T;
    type IntoIter = IntoIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
