//! # Fixed-Block Arena
//!
//! A region allocator over one pre-reserved block that reuses released
//! regions instead of ever growing.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr::NonNull;

use super::block::Block;
use super::region::{RegionMeta, RegionTable, ReleaseFault};
use super::stats::ArenaStats;
use crate::config::{ArenaConfig, ReclaimPolicy};
use crate::error::{AllocError, AllocResult, ConfigError, ConfigResult};

/// A fixed-capacity region allocator.
///
/// Requests are served by reusing the smallest suitable released region, or
/// by carving a new region from the never-used tail of the block. The block
/// is allocated once and never resized; when neither source fits, allocation
/// fails with [`AllocError::OutOfMemory`].
///
/// Allocation and release take `&self`, so any number of containers can
/// draw from one arena at the same time. The borrow keeps the arena alive
/// for as long as they hold it.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe (it is neither `Send` nor `Sync`).
///
/// # Example
///
/// ```rust
/// use fixalloc_core::Arena;
///
/// let arena = Arena::new(1024);
///
/// let ptr = arena.allocate(100, 8)?;
/// assert_eq!(arena.stats().occupied, 1);
///
/// arena.release(ptr, 100)?;
/// assert_eq!(arena.stats().free, 1);
/// # Ok::<(), fixalloc_core::AllocError>(())
/// ```
pub struct Arena {
    /// The backing storage. `None` for the empty stand-in.
    block: Option<Block>,
    /// Boundary of never-used space, as an offset into the block.
    cursor: Cell<usize>,
    /// Every region carved so far.
    regions: RefCell<RegionTable>,
    /// Reclamation policy chosen at construction.
    policy: ReclaimPolicy,
}

impl Arena {
    /// Creates an arena with `capacity` bytes and default settings.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Total size in bytes
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too large to allocate.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, ReclaimPolicy::default())
    }

    /// Creates an arena with `capacity` bytes and the given policy.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too large to allocate.
    #[must_use]
    pub fn with_policy(capacity: usize, policy: ReclaimPolicy) -> Self {
        match Self::with_config(&ArenaConfig::new(capacity).with_policy(policy)) {
            Ok(arena) => arena,
            Err(err) => panic!("cannot create arena: {err}"),
        }
    }

    /// Creates an arena from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the
    /// config does not pass [`ArenaConfig::validate`].
    pub fn with_config(config: &ArenaConfig) -> ConfigResult<Self> {
        config.validate()?;

        if config.capacity == 0 {
            tracing::debug!(policy = ?config.policy, "empty arena created");
            return Ok(Self {
                block: None,
                cursor: Cell::new(0),
                regions: RefCell::new(RegionTable::new(config.policy)),
                policy: config.policy,
            });
        }

        let layout = Layout::from_size_align(config.capacity, config.block_align)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        let block = Block::new(layout);

        tracing::debug!(
            capacity = config.capacity,
            policy = ?config.policy,
            base = block.addr(),
            "arena created"
        );

        Ok(Self {
            block: Some(block),
            cursor: Cell::new(0),
            regions: RefCell::new(RegionTable::new(config.policy)),
            policy: config.policy,
        })
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, Block::len)
    }

    /// Returns the bytes consumed from the block so far (the cursor).
    ///
    /// Released regions still count: they are reused, never handed back to
    /// the tail.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    /// Returns the never-used bytes behind the cursor.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Returns the reclamation policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> ReclaimPolicy {
        self.policy
    }

    /// Returns the number of regions currently handed out.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.regions.borrow().occupied_count()
    }

    /// Returns the number of released regions available for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.regions.borrow().free_count()
    }

    /// Snapshot of capacity, usage and region counts.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let regions = self.regions.borrow();
        ArenaStats {
            capacity: self.capacity(),
            used: self.used(),
            occupied: regions.occupied_count(),
            free: regions.free_count(),
        }
    }

    /// Allocates `bytes` bytes aligned to `alignment`.
    ///
    /// A released region is reused when one is large enough and suitably
    /// aligned; otherwise a new region is carved at the cursor, rounded up to
    /// `alignment`. A zero-byte request still occupies one byte so that
    /// every live region has a distinct address.
    ///
    /// The returned memory is uninitialised.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Size of the region
    /// * `alignment` - Required alignment of the returned address
    ///
    /// # Errors
    ///
    /// - [`AllocError::InvalidAlignment`] if `alignment` is not a power of two
    /// - [`AllocError::OutOfMemory`] if no free region or tail space fits;
    ///   the arena is left unchanged
    pub fn allocate(&self, bytes: usize, alignment: usize) -> AllocResult<NonNull<u8>> {
        if !alignment.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { alignment });
        }

        let out_of_memory = AllocError::OutOfMemory {
            requested: bytes,
            alignment,
            remaining: self.remaining(),
        };
        let Some(block) = self.block.as_ref() else {
            return Err(out_of_memory);
        };

        let base = block.addr();
        let mut regions = self.regions.borrow_mut();

        if let Some(offset) = regions.reuse(bytes, alignment, base) {
            tracing::trace!(offset, bytes, alignment, "region reused");
            return Ok(block.ptr_at(offset));
        }

        let extent = bytes.max(1);
        let cursor = self.cursor.get();
        let carved = align_up(base + cursor, alignment)
            .map(|addr| addr - base)
            .and_then(|start| Some((start, start.checked_add(extent)?)))
            .filter(|&(_, end)| end <= block.len());

        let Some((start, end)) = carved else {
            tracing::debug!(bytes, alignment, remaining = block.len() - cursor, "arena exhausted");
            return Err(out_of_memory);
        };

        regions.insert(
            start,
            RegionMeta {
                size: bytes,
                extent,
                alignment,
                occupied: true,
            },
        );
        self.cursor.set(end);

        tracing::trace!(offset = start, bytes, alignment, "region carved");
        Ok(block.ptr_at(start))
    }

    /// Allocates a region fitting `layout`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::allocate`].
    #[inline]
    pub fn allocate_layout(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        self.allocate(layout.size(), layout.align())
    }

    /// Returns a region to the arena for reuse.
    ///
    /// `bytes` must equal the size passed to the allocation that produced
    /// `ptr`. The bytes themselves are left as they are.
    ///
    /// # Errors
    ///
    /// - [`AllocError::UnknownBlock`] if `ptr` is not the start of a region
    ///   currently handed out by this arena (foreign pointer, double release)
    /// - [`AllocError::SizeMismatch`] if `bytes` disagrees with the recorded size
    pub fn release(&self, ptr: NonNull<u8>, bytes: usize) -> AllocResult<()> {
        let address = ptr.as_ptr() as usize;
        let offset = self
            .offset_of(ptr)
            .ok_or(AllocError::UnknownBlock { address })?;

        match self.regions.borrow_mut().release(offset, bytes) {
            Ok(_) => {
                tracing::trace!(offset, bytes, "region released");
                Ok(())
            }
            Err(ReleaseFault::NotOccupied) => Err(AllocError::UnknownBlock { address }),
            Err(ReleaseFault::SizeMismatch { recorded }) => Err(AllocError::SizeMismatch {
                recorded,
                supplied: bytes,
            }),
        }
    }

    /// Returns a region allocated with `layout`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::release`].
    #[inline]
    pub fn release_layout(&self, ptr: NonNull<u8>, layout: Layout) -> AllocResult<()> {
        self.release(ptr, layout.size())
    }

    /// Whether `ptr` points into this arena's block.
    #[must_use]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        self.offset_of(ptr).is_some()
    }

    /// Recorded size of the occupied region starting at `ptr`.
    #[must_use]
    pub fn region_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = self.offset_of(ptr)?;
        self.regions.borrow().occupied(offset).map(|meta| meta.size)
    }

    /// All occupied regions as `(offset, metadata)`, in offset order.
    #[must_use]
    pub fn occupied_regions(&self) -> Vec<(usize, RegionMeta)> {
        self.regions.borrow().occupied_regions()
    }

    /// Forgets every region and rewinds the cursor to the block start.
    ///
    /// Pointers handed out earlier must no longer be used. Outstanding
    /// regions are reported as a warning.
    ///
    /// Returns the number of regions that were still occupied.
    pub fn reset(&mut self) -> usize {
        let leaked = self.warn_on_leaks("reset");
        self.regions.get_mut().clear();
        self.cursor.set(0);
        leaked
    }

    /// Moves the block, cursor and region table into a new arena.
    ///
    /// `self` becomes an empty stand-in: zero capacity, no block, every
    /// allocation fails, and dropping it does nothing.
    #[must_use]
    pub fn take(&mut self) -> Self {
        tracing::debug!(capacity = self.capacity(), "arena ownership transferred");
        std::mem::take(self)
    }

    /// Releases the block. Safe to call more than once.
    ///
    /// Outstanding regions are reported as a warning; teardown itself never
    /// fails. Afterwards the arena behaves like the empty stand-in.
    ///
    /// Returns the number of regions that were still occupied; 0 when the
    /// block was already gone.
    pub fn teardown(&mut self) -> usize {
        if self.block.is_none() {
            return 0;
        }

        let leaked = self.warn_on_leaks("teardown");
        self.block = None;
        self.regions.get_mut().clear();
        self.cursor.set(0);
        leaked
    }

    fn warn_on_leaks(&self, phase: &'static str) -> usize {
        let leaked = self.occupied_count();
        if leaked > 0 {
            tracing::warn!(leaked, phase, "arena still holds occupied regions");
        }
        leaked
    }

    #[inline]
    fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        self.block.as_ref()?.offset_of(ptr)
    }
}

/// Rounds `addr` up to a multiple of `alignment` (a power of two).
#[inline]
fn align_up(addr: usize, alignment: usize) -> Option<usize> {
    Some(addr.checked_add(alignment - 1)? & !(alignment - 1))
}

impl Default for Arena {
    /// The empty stand-in: no block, zero capacity.
    fn default() -> Self {
        Self {
            block: None,
            cursor: Cell::new(0),
            regions: RefCell::new(RegionTable::new(ReclaimPolicy::default())),
            policy: ReclaimPolicy::default(),
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Arenas are equal only to themselves.
impl PartialEq for Arena {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Arena {}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("block", &self.block)
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}
