//! # Backing Block
//!
//! The single raw allocation an arena carves its regions from.

// SAFETY: Owning a raw heap block requires unsafe allocation calls.
// Every unsafe block below states the invariant it relies on.
#![allow(unsafe_code)]

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

/// One contiguous, uninitialised heap block with a fixed layout.
///
/// The block is never read or written through references here; callers
/// receive raw pointers into it and own the bytes behind them.
pub(crate) struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Block {
    /// Allocates `layout`. `layout.size()` must be nonzero.
    pub(crate) fn new(layout: Layout) -> Self {
        assert!(layout.size() > 0, "block size must be nonzero");

        // SAFETY: layout has a nonzero size (checked above).
        let raw = unsafe { alloc(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            handle_alloc_error(layout);
        };

        Self { ptr, layout }
    }

    /// Address of the first byte.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size in bytes.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer to the byte at `offset`.
    #[inline]
    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset < self.len(), "offset {offset} outside block");

        // SAFETY: offset is in bounds of the allocation, so the result stays
        // inside it and cannot be null.
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) }
    }

    /// Offset of `ptr` from the block start, if `ptr` lies inside the block.
    #[inline]
    pub(crate) fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = (ptr.as_ptr() as usize).checked_sub(self.addr())?;
        (offset < self.len()).then_some(offset)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: ptr came from `alloc` with exactly this layout, and a Block
        // is dropped at most once.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_alignment() {
        let block = Block::new(Layout::from_size_align(256, 64).unwrap());
        assert_eq!(block.addr() % 64, 0);
        assert_eq!(block.len(), 256);
    }

    #[test]
    fn test_offset_round_trip() {
        let block = Block::new(Layout::from_size_align(128, 16).unwrap());
        let ptr = block.ptr_at(40);
        assert_eq!(block.offset_of(ptr), Some(40));
        assert_eq!(ptr.as_ptr() as usize, block.addr() + 40);
    }

    #[test]
    fn test_offset_of_foreign_pointer() {
        let block = Block::new(Layout::from_size_align(128, 16).unwrap());
        let mut outside = 0u8;
        assert_eq!(block.offset_of(NonNull::from(&mut outside)), None);

        // One past the end is not inside the block.
        let end = block.ptr_at(127).as_ptr().wrapping_add(1);
        assert_eq!(block.offset_of(NonNull::new(end).unwrap()), None);
    }
}
