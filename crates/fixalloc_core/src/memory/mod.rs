//! # Memory Management
//!
//! One fixed block per arena, carved into regions on demand.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once, at construction. Afterwards:
//! - No growth: exhaustion is an error
//! - Released regions are reused, smallest fit first
//! - Regions are keyed by block offset, never by a bare address

mod arena;
mod block;
mod region;
mod stats;

pub use arena::Arena;
pub use region::RegionMeta;
pub use stats::ArenaStats;
