//! Atomic directory removal.
//!
//! `remove_dir_all` deletes children before the directory itself, so for a
//! short window a lock directory would be visible with zero entries. Other
//! processes would read that as a corrupt lock. Instead the directory is
//! renamed out of the way first and the renamed copy is deleted at leisure.
//!
//! # Implementation Strategy
//!
//! 1. Rename `{dir}/{name}` to a hidden sibling `{dir}/.{name}.{pid}.{nanos}.released`
//! 2. Recursively remove the renamed directory
//!
//! Step 1 is a single `rename()`, atomic when source and destination share a
//! filesystem, which siblings always do. On crash after step 1 a tombstone
//! directory may remain; it never matches a lock path.

use crate::error::{DirlockError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Atomically remove a directory from its path, then delete its contents.
///
/// # Returns
///
/// * `Ok(true)` - The directory was removed
/// * `Ok(false)` - The directory no longer existed (a concurrent release won)
/// * `Err(DirlockError::Os)` - On rename or removal failure
pub fn remove_dir_atomic<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let tombstone = generate_tombstone_path(path)?;

    match fs::rename(path, &tombstone) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(DirlockError::os(
                format!("failed to detach lock directory '{}'", path.display()),
                e,
            ));
        }
    }

    fs::remove_dir_all(&tombstone).map_err(|e| {
        DirlockError::os(
            format!(
                "released lock '{}' but failed to delete '{}'",
                path.display(),
                tombstone.display()
            ),
            e,
        )
    })?;

    Ok(true)
}

/// Generate a unique hidden sibling path for a directory being removed.
fn generate_tombstone_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new(""));
    let name = target.file_name().ok_or_else(|| {
        DirlockError::InvalidArgument(format!(
            "lock path '{}' has no final component",
            target.display()
        ))
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let tombstone = format!(
        ".{}.{}.{}.released",
        name.to_string_lossy(),
        std::process::id(),
        nanos
    );
    Ok(parent.join(tombstone))
}
