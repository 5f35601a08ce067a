//! # FIXALLOC Core
//!
//! A fixed-capacity arena that serves variable-size, aligned allocations out
//! of one pre-reserved block, tracks every outstanding region, and reuses
//! released regions without ever growing the block.
//!
//! ## Architecture Rules
//!
//! 1. **One block, allocated once** - exhaustion is [`AllocError::OutOfMemory`]
//! 2. **Every region is tracked** - releasing anything else is
//!    [`AllocError::UnknownBlock`]
//! 3. **No knowledge of consumers** - containers live in other crates
//!
//! ## Example
//!
//! ```rust
//! use fixalloc_core::{Arena, ArenaConfig, ReclaimPolicy};
//!
//! let config = ArenaConfig::new(4096).with_policy(ReclaimPolicy::Tombstone);
//! let arena = Arena::with_config(&config)?;
//!
//! let ptr = arena.allocate(64, 16)?;
//! arena.release(ptr, 64)?;
//!
//! // The released region is handed out again; the cursor stays put.
//! let used = arena.used();
//! let again = arena.allocate(64, 16)?;
//! assert_eq!(ptr, again);
//! assert_eq!(arena.used(), used);
//! # arena.release(again, 64)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod memory;

pub use config::{ArenaConfig, ReclaimPolicy, DEFAULT_BLOCK_ALIGN, DEFAULT_CAPACITY};
pub use error::{AllocError, AllocResult, ConfigError, ConfigResult};
pub use memory::{Arena, ArenaStats, RegionMeta};
