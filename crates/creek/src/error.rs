//! Error types for rotating writer operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for writer operations.
pub type CreekResult<T> = Result<T, CreekError>;

/// Errors surfaced to callers of [`crate::RotatingWriter`].
#[derive(Debug, Error)]
pub enum CreekError {
    /// A single write is larger than the configured capacity.
    ///
    /// Such a write can never succeed, even after rotation.
    #[error("write length {len} exceeds maximum file size {capacity}")]
    CapacityExceeded {
        /// The requested write length.
        len: u64,
        /// The configured capacity in bytes.
        capacity: u64,
    },

    /// The configured maximum size is zero or too large to express in bytes.
    #[error("invalid maximum file size: {max_size_mb} MB")]
    InvalidCapacity {
        /// The rejected size in megabytes.
        max_size_mb: u64,
    },

    /// Getting the log file's metadata failed.
    #[error("error getting log file info for {path}: {source}")]
    Stat {
        /// The active log path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Listing the log directory for leftover backups failed.
    #[error("could not read log directory of {path}: {source}")]
    ReadDir {
        /// The active log path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Creating the log file's parent directories failed.
    #[error("could not create directories for new log file {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Opening or creating the log file failed.
    #[error("could not open log file {path}: {source}")]
    Open {
        /// The active log path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Renaming the active file to its backup name failed.
    #[error("could not rename log file {from} to {to}: {source}")]
    Rename {
        /// The active log path.
        from: PathBuf,
        /// The backup path.
        to: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing to the active file failed.
    #[error("could not write to log file {path}: {source}")]
    Write {
        /// The active log path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Flushing or syncing the active file failed.
    #[error("could not sync log file {path}: {source}")]
    Sync {
        /// The active log path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CreekError {
    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::CapacityExceeded { .. } | Self::InvalidCapacity { .. } => {
                io::ErrorKind::InvalidInput
            }
            Self::Stat { source, .. }
            | Self::ReadDir { source, .. }
            | Self::CreateDir { source, .. }
            | Self::Open { source, .. }
            | Self::Rename { source, .. }
            | Self::Write { source, .. }
            | Self::Sync { source, .. } => source.kind(),
        }
    }
}

impl From<CreekError> for io::Error {
    fn from(err: CreekError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

/// Errors from compressing a rotated backup.
///
/// The background compressor only logs these; they are returned directly
/// by [`crate::compress_file`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The backup could not be opened for reading.
    #[error("could not open log file for compression {path}: {source}")]
    Open {
        /// The backup path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The `.gz` destination could not be created.
    #[error("could not create file for compression {path}: {source}")]
    Create {
        /// The `.gz` path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Streaming the backup through gzip failed.
    #[error("error compressing log file {path}: {source}")]
    Compress {
        /// The backup path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The uncompressed backup could not be removed after compression.
    #[error("error removing old log file {path}: {source}")]
    Remove {
        /// The backup path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}
