//! Writer configuration.

use crate::error::CreekResult;
use crate::rotation::Capacity;
use std::path::{Path, PathBuf};

/// Maximum size of the active file, in the unit the caller gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxSize {
    /// Megabytes of 1,048,576 bytes.
    Megabytes(u64),
    /// Exact byte count.
    Bytes(u64),
}

/// Configuration for a [`crate::RotatingWriter`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the active log file.
    pub path: PathBuf,

    /// Maximum size of the active file before rotation.
    pub max_size: MaxSize,

    /// Unix permission bits for newly created log files.
    ///
    /// A file that replaces a rotated one copies the rotated file's
    /// permissions instead.
    pub file_mode: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("creek.log"),
            max_size: MaxSize::Megabytes(10),
            file_mode: 0o644,
        }
    }
}

impl Config {
    /// Creates a configuration for the given log path with default values.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Sets the maximum file size in megabytes.
    #[must_use]
    pub const fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size = MaxSize::Megabytes(megabytes);
        self
    }

    /// Sets the maximum file size in bytes.
    #[must_use]
    pub const fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size = MaxSize::Bytes(bytes);
        self
    }

    /// Sets the permission bits for newly created log files.
    #[must_use]
    pub const fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Validates the configured maximum size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CreekError::InvalidCapacity`] if the size is zero or
    /// a megabyte count overflows `u64` when converted to bytes.
    pub fn capacity(&self) -> CreekResult<Capacity> {
        match self.max_size {
            MaxSize::Megabytes(megabytes) => Capacity::from_megabytes(megabytes),
            MaxSize::Bytes(bytes) => Capacity::from_bytes(bytes),
        }
    }
}
