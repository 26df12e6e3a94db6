//! Size-rotating log file writer.

use crate::backup::unique_backup_name;
use crate::compress;
use crate::config::Config;
use crate::error::{CreekError, CreekResult};
use crate::rotation::{Capacity, OpenPlan};
use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A log file writer that rotates once the file reaches a maximum size.
///
/// Writes append to the active file. When a write would take the file past
/// its capacity, the file is renamed to a timestamped backup, a background
/// job compresses the backup to `.gz`, and a fresh file is opened at the
/// original path.
///
/// # Thread Safety
///
/// Every call holds one internal lock for its full duration, so the capacity
/// check, any rotation and the write itself happen as a single step with
/// respect to other callers. Compression jobs run outside the lock and never
/// touch the writer's state.
///
/// # State
///
/// A writer starts closed and does no I/O until the first write. That write
/// creates the file, resumes an existing one in append mode (continuing the
/// size count from its length on disk), or rotates an existing one that is
/// already too full. [`RotatingWriter::close`] releases the file; a later
/// write opens it again the same way.
///
/// The writer emits no tracing events while its lock is held, so it can be
/// the sink of the subscriber it logs through.
///
/// # Example
///
/// ```no_run
/// use creek::RotatingWriter;
///
/// let writer = RotatingWriter::new("logs/api.log", 10).unwrap();
/// writer.write(b"starting server\n").unwrap();
/// writer.close().unwrap();
/// ```
#[derive(Debug)]
pub struct RotatingWriter {
    path: PathBuf,
    capacity: Capacity,
    file_mode: u32,
    active: Mutex<Option<ActiveFile>>,
}

/// The open log file and the bytes written to it.
#[derive(Debug)]
struct ActiveFile {
    file: File,
    size: u64,
}

/// A rotation that happened during a write, logged after the lock is
/// released.
#[derive(Debug)]
struct Rotation {
    backup: PathBuf,
    dispatch: io::Result<()>,
}

impl Rotation {
    fn report(self) {
        debug!(backup = %self.backup.display(), "rotated log file");
        if let Err(err) = self.dispatch {
            warn!(
                error = %err,
                backup = %self.backup.display(),
                "could not start log compression; backup left uncompressed"
            );
        }
    }
}

impl RotatingWriter {
    /// Creates a writer for `path` that rotates at `max_size_mb` megabytes.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::InvalidCapacity`] if `max_size_mb` is zero or
    /// too large.
    pub fn new(path: impl AsRef<Path>, max_size_mb: u64) -> CreekResult<Self> {
        Self::with_config(Config::new(path).max_size_mb(max_size_mb))
    }

    /// Creates a writer from a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::InvalidCapacity`] if the configured size is zero
    /// or too large.
    pub fn with_config(config: Config) -> CreekResult<Self> {
        let capacity = config.capacity()?;
        Ok(Self {
            path: config.path,
            capacity,
            file_mode: config.file_mode,
            active: Mutex::new(None),
        })
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the maximum size of the active file.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Returns the number of bytes written to the active file, counting
    /// any content it had when resumed. Zero while closed.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.active.lock().as_ref().map_or(0, |active| active.size)
    }

    /// Returns true if a log file is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Appends `buf` to the log, rotating first if it would not fit.
    ///
    /// Returns the number of bytes the file accepted, which is what the
    /// size count grows by.
    ///
    /// # Errors
    ///
    /// - [`CreekError::CapacityExceeded`] if `buf` is larger than the
    ///   capacity; nothing is opened or written
    /// - [`CreekError::Stat`], [`CreekError::CreateDir`],
    ///   [`CreekError::Open`] or [`CreekError::Rename`] if opening or
    ///   rotating the file fails; the writer is left closed and the next
    ///   write starts over from what is on disk
    /// - [`CreekError::Write`] if the write itself fails
    pub fn write(&self, buf: &[u8]) -> CreekResult<usize> {
        let len = buf.len() as u64;
        self.capacity.check(len)?;

        let mut rotation = None;
        let result = self.write_locked(buf, len, &mut rotation);

        // A rename that went through is reported even if reopening failed.
        if let Some(rotation) = rotation {
            rotation.report();
        }
        result
    }

    /// Runs the open, rotate and write steps under the lock.
    fn write_locked(
        &self,
        buf: &[u8],
        len: u64,
        rotation: &mut Option<Rotation>,
    ) -> CreekResult<usize> {
        let mut slot = self.active.lock();

        let active = match slot.take() {
            Some(active) => active,
            None => self.open_existing_or_new(len, rotation)?,
        };
        let active = if self.capacity.must_rotate(active.size, len) {
            drop(active);
            self.roll_over(rotation)?
        } else {
            active
        };
        let active = slot.insert(active);

        let written = active.file.write(buf).map_err(|source| CreekError::Write {
            path: self.path.clone(),
            source,
        })?;
        active.size += written as u64;
        Ok(written)
    }

    /// Flushes the active file, if one is open.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::Sync`] if the flush fails.
    pub fn flush(&self) -> CreekResult<()> {
        let mut slot = self.active.lock();
        match slot.as_mut() {
            Some(active) => active.file.flush().map_err(|source| self.sync_error(source)),
            None => Ok(()),
        }
    }

    /// Syncs the active file's data and metadata to disk, if one is open.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::Sync`] if the sync fails.
    pub fn sync(&self) -> CreekResult<()> {
        let slot = self.active.lock();
        match slot.as_ref() {
            Some(active) => active.file.sync_all().map_err(|source| self.sync_error(source)),
            None => Ok(()),
        }
    }

    /// Syncs and releases the active file.
    ///
    /// Closing a writer that is already closed does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::Sync`] if the final sync fails. The file is
    /// released either way.
    pub fn close(&self) -> CreekResult<()> {
        let Some(active) = self.active.lock().take() else {
            return Ok(());
        };
        active.file.sync_all().map_err(|source| self.sync_error(source))
    }

    /// Opens the log file for the first write after construction or close.
    fn open_existing_or_new(
        &self,
        incoming: u64,
        rotation: &mut Option<Rotation>,
    ) -> CreekResult<ActiveFile> {
        let on_disk = self.stat()?.map(|meta| meta.len());

        match self.capacity.plan_open(on_disk, incoming) {
            OpenPlan::CreateNew | OpenPlan::Rotate => self.roll_over(rotation),
            OpenPlan::Resume { size } => {
                match OpenOptions::new().append(true).open(&self.path) {
                    Ok(file) => Ok(ActiveFile { file, size }),
                    // Can't append; move it aside and start a new file.
                    Err(_) => self.roll_over(rotation),
                }
            }
        }
    }

    /// Moves any existing file to a backup and opens an empty one.
    ///
    /// The caller must already have released the handle to the old file.
    fn roll_over(&self, rotation: &mut Option<Rotation>) -> CreekResult<ActiveFile> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CreekError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let previous = self.stat()?;
        if previous.is_some() {
            let backup = unique_backup_name(&self.path, Utc::now());
            fs::rename(&self.path, &backup).map_err(|source| CreekError::Rename {
                from: self.path.clone(),
                to: backup.clone(),
                source,
            })?;

            let dispatch = compress::spawn(backup.clone());
            *rotation = Some(Rotation { backup, dispatch });
        }

        let file = self.create_file(previous.as_ref())?;
        Ok(ActiveFile { file, size: 0 })
    }

    fn create_file(&self, previous: Option<&Metadata>) -> CreekResult<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            let mode = previous.map_or(self.file_mode, |meta| meta.permissions().mode() & 0o7777);
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = (previous, self.file_mode);

        options.open(&self.path).map_err(|source| CreekError::Open {
            path: self.path.clone(),
            source,
        })
    }

    fn stat(&self) -> CreekResult<Option<Metadata>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CreekError::Stat {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn sync_error(&self, source: io::Error) -> CreekError {
        CreekError::Sync {
            path: self.path.clone(),
            source,
        }
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingWriter::flush(*self).map_err(io::Error::from)
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        RotatingWriter::flush(self).map_err(io::Error::from)
    }
}
