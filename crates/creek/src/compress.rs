//! Background gzip compression of rotated backups.
//!
//! Compression never reports back to the writer. A job that fails is logged
//! and abandoned, leaving the uncompressed backup in place; a job cut short
//! by process exit does the same. Either way the backup can be picked up
//! later with [`compress_pending`].

use crate::backup::pending_backups;
use crate::error::{CompressError, CreekError, CreekResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

/// Name of the threads running compression jobs.
const THREAD_NAME: &str = "creek-compress";

/// Returns `<path>.gz`.
#[must_use]
pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compresses `path` into `<path>.gz` and removes `path`.
///
/// The original is only removed once the gzip trailer has been written and
/// the compressed file synced to disk. If compression fails part way, the
/// partial `.gz` is removed and the original is left untouched.
///
/// Returns the path of the compressed file.
///
/// # Errors
///
/// Returns a [`CompressError`] naming the step that failed.
pub fn compress_file(path: &Path) -> Result<PathBuf, CompressError> {
    let source = File::open(path).map_err(|source| CompressError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let target = gz_path(path);
    let dest = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&target)
        .map_err(|source| CompressError::Create {
            path: target.clone(),
            source,
        })?;

    if let Err(source) = encode(source, dest) {
        let _ = fs::remove_file(&target);
        return Err(CompressError::Compress {
            path: path.to_path_buf(),
            source,
        });
    }

    fs::remove_file(path).map_err(|source| CompressError::Remove {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(target)
}

fn encode(source: File, dest: File) -> io::Result<()> {
    let mut reader = BufReader::new(source);
    let mut encoder = GzEncoder::new(BufWriter::new(dest), Compression::default());
    io::copy(&mut reader, &mut encoder)?;

    let mut writer = encoder.finish()?;
    writer.flush()?;
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()
}

/// Compresses `path` on a detached background thread.
///
/// The caller keeps no handle to the job. The outcome is only logged.
///
/// # Errors
///
/// Returns an error if the thread could not be started; the backup is then
/// left uncompressed.
pub fn spawn(path: PathBuf) -> io::Result<()> {
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || run_job(&path))
        .map(drop)
}

fn run_job(path: &Path) {
    match compress_file(path) {
        Ok(compressed) => debug!(
            backup = %path.display(),
            compressed = %compressed.display(),
            "compressed rotated log file"
        ),
        Err(err) => warn!(error = %err, "log compression failed"),
    }
}

/// Synchronously compresses every backup of `active` left uncompressed.
///
/// Backups that fail to compress are logged and skipped. Must not run while
/// a writer is rotating `active`, since its own jobs could race with these.
///
/// Returns the paths of the compressed files.
///
/// # Errors
///
/// Returns [`CreekError::ReadDir`] if the backup directory cannot be read.
pub fn compress_pending(active: &Path) -> CreekResult<Vec<PathBuf>> {
    let pending = pending_backups(active).map_err(|source| CreekError::ReadDir {
        path: active.to_path_buf(),
        source,
    })?;
    if !pending.is_empty() {
        info!(
            count = pending.len(),
            active = %active.display(),
            "compressing leftover backups"
        );
    }

    let mut compressed = Vec::with_capacity(pending.len());
    for backup in pending {
        match compress_file(&backup) {
            Ok(path) => compressed.push(path),
            Err(err) => warn!(error = %err, "log compression failed"),
        }
    }
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::backup_name;
    use chrono::Utc;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn gunzip(path: &Path) -> Vec<u8> {
        let mut data = Vec::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_end(&mut data)
            .unwrap();
        data
    }

    #[test]
    fn gz_path_appends_suffix() {
        assert_eq!(
            gz_path(Path::new("logs/app-1.log")),
            PathBuf::from("logs/app-1.log.gz")
        );
    }

    #[test]
    fn compress_replaces_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        fs::write(&path, b"ABC").unwrap();

        let compressed = compress_file(&path).unwrap();

        assert_eq!(compressed, dir.path().join("test.log.gz"));
        assert!(!path.exists());
        assert_eq!(gunzip(&compressed), b"ABC");
    }

    #[test]
    fn compress_preserves_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let compressed = compress_file(&path).unwrap();
        assert_eq!(gunzip(&compressed), content);
    }

    #[test]
    fn compress_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.log");
        fs::write(&path, b"").unwrap();

        let compressed = compress_file(&path).unwrap();
        assert!(gunzip(&compressed).is_empty());
    }

    #[test]
    fn compress_missing_file_fails_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.log");

        let result = compress_file(&path);
        assert!(matches!(result, Err(CompressError::Open { .. })));
        assert!(!gz_path(&path).exists());
    }

    #[test]
    fn spawned_job_compresses_in_background() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bg.log");
        fs::write(&path, b"background").unwrap();

        spawn(path.clone()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while path.exists() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!path.exists());
        assert_eq!(gunzip(&gz_path(&path)), b"background");
    }

    #[test]
    fn pending_backups_are_recovered() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        let backup = backup_name(&active, Utc::now());
        fs::write(&active, b"live").unwrap();
        fs::write(&backup, b"left behind").unwrap();

        let compressed = compress_pending(&active).unwrap();

        assert_eq!(compressed, vec![gz_path(&backup)]);
        assert!(!backup.exists());
        assert_eq!(fs::read(&active).unwrap(), b"live");
        assert_eq!(gunzip(&compressed[0]), b"left behind");
    }

    #[test]
    fn pending_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("gone").join("app.log");

        let result = compress_pending(&active);
        assert!(matches!(result, Err(CreekError::ReadDir { .. })));
    }
}
