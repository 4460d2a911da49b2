//! Ownership marker parsing and lock directory inspection.

use crate::error::{DirlockError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Why a lock directory has no usable ownership marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Corruption {
    /// The directory has no entries (owner crashed before writing its marker,
    /// or is about to write it).
    Empty,
    /// The directory has more than one entry.
    MultipleEntries(usize),
    /// The single entry is not a valid owner pid.
    InvalidMarker(String),
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corruption::Empty => write!(f, "lock directory has no ownership marker"),
            Corruption::MultipleEntries(n) => {
                write!(f, "lock directory has {} entries, expected exactly one", n)
            }
            Corruption::InvalidMarker(name) => {
                write!(f, "marker '{}' is not a valid process id", name)
            }
        }
    }
}

/// Ownership of a lock directory as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum LockOwner {
    /// No lock directory exists; the lock is free.
    Absent,
    /// Held by the process with this id.
    Pid(u32),
    /// Held, but the owner cannot be determined.
    Corrupt(Corruption),
}

/// File name of the ownership marker for `pid`.
pub(crate) fn marker_name(pid: u32) -> String {
    pid.to_string()
}

/// Parse a marker file name into an owner pid.
///
/// Only plain ASCII digits are accepted; `0` is never a valid owner.
pub(crate) fn parse_marker(name: &OsStr) -> Option<u32> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|&pid| pid != 0)
}

/// Read the owner of the lock at `lock_root` without modifying anything.
///
/// # Returns
///
/// * `Ok(LockOwner::Absent)` - No lock directory exists
/// * `Ok(LockOwner::Pid(pid))` - Exactly one entry naming a valid pid
/// * `Ok(LockOwner::Corrupt(_))` - Any other directory contents
/// * `Err(DirlockError::Os)` - The directory could not be read
pub fn inspect_owner<P: AsRef<Path>>(lock_root: P) -> Result<LockOwner> {
    let lock_root = lock_root.as_ref();

    let entries = match fs::read_dir(lock_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockOwner::Absent),
        Err(e) => {
            return Err(DirlockError::os(
                format!("failed to read lock directory '{}'", lock_root.display()),
                e,
            ));
        }
    };

    let mut names = Vec::with_capacity(1);
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            // Released while we were listing it.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LockOwner::Absent),
            Err(e) => {
                return Err(DirlockError::os(
                    format!("failed to read lock directory '{}'", lock_root.display()),
                    e,
                ));
            }
        }
    }

    let owner = match names.as_slice() {
        [] => LockOwner::Corrupt(Corruption::Empty),
        [name] => match parse_marker(name) {
            Some(pid) => LockOwner::Pid(pid),
            None => LockOwner::Corrupt(Corruption::InvalidMarker(
                name.to_string_lossy().into_owned(),
            )),
        },
        many => LockOwner::Corrupt(Corruption::MultipleEntries(many.len())),
    };

    Ok(owner)
}

/// Creation time of the marker for `pid`, taken from its modification time.
///
/// Returns `None` if the marker has disappeared or the platform cannot report
/// modification times.
pub(crate) fn marker_created_at(lock_root: &Path, pid: u32) -> Result<Option<DateTime<Utc>>> {
    let marker = lock_root.join(marker_name(pid));
    match fs::metadata(&marker) {
        Ok(meta) => Ok(meta.modified().ok().map(DateTime::<Utc>::from)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DirlockError::os(
            format!("failed to stat ownership marker '{}'", marker.display()),
            e,
        )),
    }
}
