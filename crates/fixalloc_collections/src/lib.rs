//! # FIXALLOC Collections
//!
//! Containers whose storage comes from a [`fixalloc_core::Arena`].
//!
//! ## Design Philosophy
//!
//! - Containers borrow their arena; the arena outlives every node
//! - Allocation failure is a `Result`, never a panic
//! - Nodes go back to the arena the moment they are removed
//!
//! ## Example
//!
//! ```rust
//! use fixalloc_collections::LinkedQueue;
//! use fixalloc_core::Arena;
//!
//! let arena = Arena::new(1024);
//! let mut queue = LinkedQueue::new(&arena);
//! queue.try_extend(1..=5)?;
//!
//! let used = arena.used();
//! for _ in 0..3 {
//!     queue.pop()?;
//! }
//! queue.try_extend(6..=8)?;
//!
//! // Popped nodes are reused, so the arena cursor has not moved.
//! assert_eq!(arena.used(), used);
//! assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![4, 5, 6, 7, 8]);
//! # Ok::<(), fixalloc_collections::QueueError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{Cursor, IntoIter, Iter, IterMut, LinkedQueue};
