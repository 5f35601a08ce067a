//! # Arena Error Types
//!
//! All errors that can occur while allocating from, releasing to, or
//! configuring an arena.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`Arena`](crate::Arena) allocation and release.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Neither a free region nor the unused tail can satisfy the request.
    #[error("out of memory: requested {requested} bytes aligned to {alignment}, {remaining} bytes of tail left")]
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
        /// Alignment requested.
        alignment: usize,
        /// Never-used bytes left behind the cursor at the time of the request.
        remaining: usize,
    },

    /// The address is not an occupied region of this arena.
    #[error("unknown block at address {address:#x}")]
    UnknownBlock {
        /// The address passed to release.
        address: usize,
    },

    /// The size passed to release differs from the size recorded at allocation.
    #[error("size mismatch on release: allocated {recorded} bytes, released {supplied}")]
    SizeMismatch {
        /// Size recorded when the region was handed out.
        recorded: usize,
        /// Size supplied by the caller.
        supplied: usize,
    },

    /// Alignment is zero or not a power of two.
    #[error("invalid alignment {alignment}: must be a nonzero power of two")]
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },
}

/// Result type for arena operations.
pub type AllocResult<T> = Result<T, AllocError>;

/// Errors raised while loading or validating an [`ArenaConfig`](crate::ArenaConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
