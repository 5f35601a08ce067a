//! # Arena Configuration
//!
//! Arena parameters, loaded once at startup from TOML or built in code.
//!
//! ```toml
//! capacity = 65536
//! policy = "tombstone"
//! block_align = 64
//! ```
//!
//! Every key is optional; missing keys fall back to [`ArenaConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default arena capacity: 1 MiB.
pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

/// Default alignment of the backing block's base address.
pub const DEFAULT_BLOCK_ALIGN: usize = 16;

/// How released regions are remembered for reuse.
///
/// Both policies hand out the same regions and report the same
/// [`ArenaStats`](crate::ArenaStats) for the same calls. Only the cost of
/// finding a reusable region differs: compact keeps a size-ordered index,
/// tombstone scans the whole table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReclaimPolicy {
    /// Released regions move into a size-ordered reuse index.
    #[default]
    Compact,
    /// Released regions stay in the region table, flagged free.
    Tombstone,
}

impl ReclaimPolicy {
    /// Both policies, for exercising behavior that must hold under either.
    pub const ALL: [Self; 2] = [Self::Compact, Self::Tombstone];
}

/// Construction parameters for an [`Arena`](crate::Arena).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Size of the backing block in bytes.
    pub capacity: usize,
    /// Reclamation policy.
    pub policy: ReclaimPolicy,
    /// Alignment of the block's base address. Power of two.
    pub block_align: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: ReclaimPolicy::default(),
            block_align: DEFAULT_BLOCK_ALIGN,
        }
    }
}

impl ArenaConfig {
    /// Creates a config with the given capacity and default everything else.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Sets the reclamation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReclaimPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the base alignment of the backing block.
    #[must_use]
    pub const fn with_block_align(mut self, block_align: usize) -> Self {
        self.block_align = block_align;
        self
    }

    /// Parses and validates a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that the values describe a block that can be allocated.
    ///
    /// A zero capacity is valid and yields an arena without a block, where
    /// every allocation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.block_align.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "block_align {} is not a power of two",
                self.block_align
            )));
        }
        if self.capacity > isize::MAX as usize - (self.block_align - 1) {
            return Err(ConfigError::Invalid(format!(
                "capacity {} exceeds the largest allocatable block",
                self.capacity
            )));
        }
        Ok(())
    }
}
