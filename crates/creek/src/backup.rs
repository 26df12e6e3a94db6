//! Backup file naming.
//!
//! A rotated log file is renamed from `<dir>/<stem><ext>` to
//! `<dir>/<stem>-<timestamp><ext>`, where the timestamp is the UTC time the
//! rotation began in RFC3339 form with millisecond precision:
//!
//! ```text
//! logs/
//! ├─ app.log                               # active file
//! ├─ app-2026-10-19T08:15:30.123Z.log      # rotated, compression pending
//! └─ app-2026-10-19T07:02:11.870Z.log.gz   # compressed backup
//! ```
//!
//! Windows does not allow `:` in file names, so there the time separators
//! are written as `-`.
//!
//! When two rotations land on the same millisecond, the later one gets a
//! sequence suffix (`app-2026-10-19T08:15:30.123Z-1.log`).

use crate::compress::gz_path;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(not(windows))]
const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
#[cfg(windows)]
const STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3fZ";

/// Returns the backup name for `path` rotated at `now`.
///
/// This is a pure function: it never touches the file system.
#[must_use]
pub fn backup_name(path: &Path, now: DateTime<Utc>) -> PathBuf {
    backup_name_with_seq(path, now, 0)
}

/// Returns the backup name for `path` rotated at `now` with a sequence
/// suffix. A `seq` of zero yields the same name as [`backup_name`].
#[must_use]
pub fn backup_name_with_seq(path: &Path, now: DateTime<Utc>, seq: u32) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut name = OsString::from(path.file_stem().unwrap_or_default());
    name.push("-");
    name.push(now.format(STAMP_FORMAT).to_string());
    if seq > 0 {
        name.push(format!("-{seq}"));
    }
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }

    dir.join(name)
}

/// Returns the first backup name for `path` at `now` that is not taken,
/// either by an uncompressed backup or by its `.gz`.
///
/// Renaming onto an existing backup would silently replace it.
#[must_use]
pub fn unique_backup_name(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let mut seq = 0;
    loop {
        let candidate = backup_name_with_seq(path, now, seq);
        if !candidate.exists() && !gz_path(&candidate).exists() {
            return candidate;
        }
        seq += 1;
    }
}

/// Lists rotated backups of `active` that have not been compressed yet.
///
/// These are left behind when the process exits while a compression job is
/// still running. Results are sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn pending_backups(active: &Path) -> io::Result<Vec<PathBuf>> {
    let dir = match active.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(stem) = active.file_stem().and_then(OsStr::to_str) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{stem}-");
    let ext = active
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let mut pending = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if is_backup_name(name, &prefix, &ext) {
            pending.push(dir.join(name));
        }
    }

    pending.sort();
    Ok(pending)
}

fn is_backup_name(name: &str, prefix: &str, ext: &str) -> bool {
    let Some(middle) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(ext))
    else {
        return false;
    };

    // Strip a "-<n>" collision suffix; the timestamp itself ends in 'Z'.
    let stamp = match middle.rsplit_once("Z-") {
        Some((stamp, seq)) if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) => {
            &middle[..=stamp.len()]
        }
        _ => middle,
    };

    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).is_ok()
}
