//! # Collection Error Types

use fixalloc_core::AllocError;
use thiserror::Error;

/// Errors that can occur in arena-backed collections.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `pop`, `front` or `back` on a queue with no elements.
    #[error("queue is empty")]
    EmptyQueue,

    /// Dereferenced a cursor positioned past the last element.
    #[error("dereferenced the end cursor")]
    EndCursorDereference,

    /// The arena refused an allocation or release.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Result type for collection operations.
pub type QueueResult<T> = Result<T, QueueError>;
