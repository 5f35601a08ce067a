//! # Region Bookkeeping
//!
//! Tracks every region an arena has carved, keyed by block offset.
//!
//! Two reclamation strategies share one interface:
//!
//! ```text
//! Compact:    occupied {offset -> meta}     free {(extent, offset)}
//!             release moves an entry across, reuse moves it back.
//!
//! Tombstone:  regions {offset -> meta, occupied: bool}
//!             release flips the flag, reuse scans for free entries.
//! ```
//!
//! Both pick the smallest free region whose extent covers the request and
//! whose address meets the requested alignment, lowest offset first on ties.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ReclaimPolicy;

/// Metadata for one carved region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionMeta {
    /// Bytes requested by the allocation currently (or last) served here.
    pub size: usize,
    /// Bytes the region physically spans; fixed when first carved.
    pub extent: usize,
    /// Alignment requested by that allocation.
    pub alignment: usize,
    /// Whether the region is currently handed out.
    pub occupied: bool,
}

/// Why a release was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReleaseFault {
    NotOccupied,
    SizeMismatch { recorded: usize },
}

/// Region table for one arena, specialised by reclamation policy.
#[derive(Debug)]
pub(crate) enum RegionTable {
    Compact(CompactTable),
    Tombstone(TombstoneTable),
}

impl RegionTable {
    pub(crate) fn new(policy: ReclaimPolicy) -> Self {
        match policy {
            ReclaimPolicy::Compact => Self::Compact(CompactTable::default()),
            ReclaimPolicy::Tombstone => Self::Tombstone(TombstoneTable::default()),
        }
    }

    /// Reuses a free region for `size` bytes, returning its offset.
    ///
    /// A zero-byte request still needs a region spanning at least one byte.
    ///
    /// `base` is the block's start address; alignment is checked on
    /// `base + offset` so that it holds for the real pointer.
    pub(crate) fn reuse(
        &mut self,
        size: usize,
        alignment: usize,
        base: usize,
    ) -> Option<usize> {
        match self {
            Self::Compact(table) => table.reuse(size, alignment, base),
            Self::Tombstone(table) => table.reuse(size, alignment, base),
        }
    }

    /// Records a freshly carved, occupied region.
    pub(crate) fn insert(&mut self, offset: usize, meta: RegionMeta) {
        debug_assert!(meta.occupied);
        match self {
            Self::Compact(table) => {
                table.occupied.insert(offset, meta);
            }
            Self::Tombstone(table) => {
                table.regions.insert(offset, meta);
                table.occupied_count += 1;
            }
        }
    }

    /// Returns an occupied region to the free pool.
    pub(crate) fn release(&mut self, offset: usize, size: usize) -> Result<RegionMeta, ReleaseFault> {
        match self {
            Self::Compact(table) => table.release(offset, size),
            Self::Tombstone(table) => table.release(offset, size),
        }
    }

    /// Metadata of the occupied region starting at `offset`.
    pub(crate) fn occupied(&self, offset: usize) -> Option<&RegionMeta> {
        match self {
            Self::Compact(table) => table.occupied.get(&offset),
            Self::Tombstone(table) => table.regions.get(&offset).filter(|meta| meta.occupied),
        }
    }

    /// All occupied regions in offset order.
    pub(crate) fn occupied_regions(&self) -> Vec<(usize, RegionMeta)> {
        match self {
            Self::Compact(table) => table.occupied.iter().map(|(&offset, &meta)| (offset, meta)).collect(),
            Self::Tombstone(table) => table
                .regions
                .iter()
                .filter(|(_, meta)| meta.occupied)
                .map(|(&offset, &meta)| (offset, meta))
                .collect(),
        }
    }

    pub(crate) fn occupied_count(&self) -> usize {
        match self {
            Self::Compact(table) => table.occupied.len(),
            Self::Tombstone(table) => table.occupied_count,
        }
    }

    pub(crate) fn free_count(&self) -> usize {
        match self {
            Self::Compact(table) => table.free.len(),
            Self::Tombstone(table) => table.regions.len() - table.occupied_count,
        }
    }

    /// Forgets every region.
    pub(crate) fn clear(&mut self) {
        match self {
            Self::Compact(table) => {
                table.occupied.clear();
                table.free.clear();
            }
            Self::Tombstone(table) => {
                table.regions.clear();
                table.occupied_count = 0;
            }
        }
    }
}

#[inline]
fn is_aligned(base: usize, offset: usize, alignment: usize) -> bool {
    (base + offset) & (alignment - 1) == 0
}

/// Occupied map plus a reuse index ordered by `(extent, offset)`.
#[derive(Debug, Default)]
pub(crate) struct CompactTable {
    occupied: BTreeMap<usize, RegionMeta>,
    free: BTreeSet<(usize, usize)>,
}

impl CompactTable {
    fn reuse(&mut self, size: usize, alignment: usize, base: usize) -> Option<usize> {
        let (extent, offset) = self
            .free
            .range((size.max(1), 0)..)
            .copied()
            .find(|&(_, offset)| is_aligned(base, offset, alignment))?;

        self.free.remove(&(extent, offset));
        self.occupied.insert(
            offset,
            RegionMeta {
                size,
                extent,
                alignment,
                occupied: true,
            },
        );
        Some(offset)
    }

    fn release(&mut self, offset: usize, size: usize) -> Result<RegionMeta, ReleaseFault> {
        let meta = *self.occupied.get(&offset).ok_or(ReleaseFault::NotOccupied)?;
        if meta.size != size {
            return Err(ReleaseFault::SizeMismatch { recorded: meta.size });
        }

        self.occupied.remove(&offset);
        self.free.insert((meta.extent, offset));
        Ok(meta)
    }
}

/// One permanent entry per offset ever carved.
#[derive(Debug, Default)]
pub(crate) struct TombstoneTable {
    regions: BTreeMap<usize, RegionMeta>,
    occupied_count: usize,
}

impl TombstoneTable {
    fn reuse(&mut self, size: usize, alignment: usize, base: usize) -> Option<usize> {
        // min_by_key keeps the first minimum, and the map iterates by offset.
        let offset = self
            .regions
            .iter()
            .filter(|(&offset, meta)| {
                !meta.occupied && meta.extent >= size.max(1) && is_aligned(base, offset, alignment)
            })
            .min_by_key(|(_, meta)| meta.extent)
            .map(|(&offset, _)| offset)?;

        if let Some(meta) = self.regions.get_mut(&offset) {
            meta.size = size;
            meta.alignment = alignment;
            meta.occupied = true;
        }
        self.occupied_count += 1;
        Some(offset)
    }

    fn release(&mut self, offset: usize, size: usize) -> Result<RegionMeta, ReleaseFault> {
        let meta = self
            .regions
            .get_mut(&offset)
            .filter(|meta| meta.occupied)
            .ok_or(ReleaseFault::NotOccupied)?;
        if meta.size != size {
            return Err(ReleaseFault::SizeMismatch { recorded: meta.size });
        }

        meta.occupied = false;
        self.occupied_count -= 1;
        Ok(*meta)
    }
}
