//! # Arena Statistics

use std::fmt;

/// Point-in-time usage figures for an [`Arena`](super::Arena).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Size of the backing block in bytes.
    pub capacity: usize,
    /// Bytes consumed from the block (the allocation cursor).
    pub used: usize,
    /// Regions currently handed out.
    pub occupied: usize,
    /// Released regions waiting for reuse.
    pub free: usize,
}

impl ArenaStats {
    /// Never-used bytes behind the cursor.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity - self.used
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arena statistics:")?;
        writeln!(f, "  capacity:         {} bytes", self.capacity)?;
        writeln!(f, "  used:             {} bytes", self.used)?;
        writeln!(f, "  occupied regions: {}", self.occupied)?;
        write!(f, "  free regions:     {}", self.free)
    }
}
