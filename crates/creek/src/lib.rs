//! # Creek
//!
//! A log file writer that rotates by size and compresses old files in the
//! background.
//!
//! [`RotatingWriter`] appends byte chunks (typically one formatted log line
//! each) to a file. Once a write would take the file past its configured
//! size, the file is renamed with a UTC timestamp, handed to a background
//! gzip job, and replaced by a fresh file at the same path.
//!
//! ## Design Principles
//!
//! - Writes are serialized; capacity checks and rotation never race
//! - The size count only includes bytes the file actually accepted
//! - Restarting a process resumes the existing file instead of truncating it
//! - Compression never blocks or fails a write; backups are kept forever
//!
//! ## File Layout
//!
//! ```text
//! logs/
//! ├─ api.log                               # active file
//! ├─ api-2026-10-19T08:15:30.123Z.log      # rotated, being compressed
//! └─ api-2026-10-19T07:02:11.870Z.log.gz   # compressed backup
//! ```
//!
//! ## Example
//!
//! ```rust
//! use creek::{Config, RotatingWriter};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = Config::new(dir.path().join("api.log")).max_size_mb(10);
//!
//! let writer = RotatingWriter::with_config(config).unwrap();
//! writer.write(b"server started\n").unwrap();
//! assert_eq!(writer.size(), 15);
//! writer.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod compress;
mod config;
mod error;
mod make_writer;
mod rotation;
mod writer;

pub use backup::{backup_name, backup_name_with_seq, pending_backups, unique_backup_name};
pub use compress::{compress_file, compress_pending, gz_path, spawn as spawn_compression};
pub use config::{Config, MaxSize};
pub use error::{CompressError, CreekError, CreekResult};
pub use rotation::{Capacity, OpenPlan, MEGABYTE};
pub use writer::RotatingWriter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
