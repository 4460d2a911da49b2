//! RAII lock guard implementation.

use super::dir_lock::DirLock;
use crate::config::LockConfig;
use crate::error::{DirlockError, Result};
use crate::liveness::{LivenessOracle, SystemLiveness};
use std::path::Path;
use tracing::warn;

/// RAII guard for a held lock directory.
///
/// When dropped, the lock is released, including during unwinding.
/// If release fails, a warning is logged but no panic occurs.
#[derive(Debug)]
pub struct LockGuard<L = SystemLiveness> {
    /// The acquired lock.
    lock: DirLock<L>,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard<SystemLiveness> {
    /// Block until the lock described by `config` is acquired.
    pub fn acquire(config: LockConfig) -> Result<Self> {
        DirLock::new(config)?.guard()
    }

    /// Acquire the lock described by `config` if it is free right now.
    pub fn try_acquire(config: LockConfig) -> Result<Option<Self>> {
        DirLock::new(config)?.try_guard()
    }
}

impl<L> LockGuard<L> {
    /// Wrap an already-acquired lock.
    pub(super) fn new(lock: DirLock<L>) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Get the path to the lock directory.
    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Get the owner pid recorded in the marker.
    pub fn pid(&self) -> u32 {
        self.lock.pid()
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release the lock before the guard
    /// goes out of scope, and want to handle the outcome explicitly.
    /// `Ok(false)` means the lock was no longer ours to release.
    pub fn release(mut self) -> Result<bool> {
        self.released = true;
        self.lock.release()
    }
}

impl<L> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.lock.release() {
            Ok(true) => {}
            Ok(false) => warn!(
                path = %self.lock.path().display(),
                pid = self.lock.pid(),
                "lock was no longer held by this owner at release"
            ),
            Err(e) => warn!(
                path = %self.lock.path().display(),
                error = %e,
                "failed to release lock"
            ),
        }
    }
}

/// Run `f` while holding the lock described by `config`.
///
/// See [`run_locked`].
pub fn with_lock<T, E, F>(config: LockConfig, f: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<DirlockError>,
{
    run_locked(DirLock::new(config)?, f)
}

/// Acquire `lock` (blocking), run `f`, then release.
///
/// An error from `f` always wins: if release also fails, that failure is
/// logged and `f`'s error is returned. If `f` succeeds, a release error is
/// returned in its place. The lock is released even if `f` panics.
pub fn run_locked<L, T, E, F>(lock: DirLock<L>, f: F) -> std::result::Result<T, E>
where
    L: LivenessOracle,
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<DirlockError>,
{
    let guard = lock.guard()?;
    let path = guard.path().to_path_buf();
    let outcome = f();
    let released = guard.release();

    match (outcome, released) {
        (Err(e), Err(release_err)) => {
            warn!(
                path = %path.display(),
                error = %release_err,
                "failed to release lock after error"
            );
            Err(e)
        }
        (Err(e), Ok(_)) => Err(e),
        (Ok(value), Ok(true)) => Ok(value),
        (Ok(value), Ok(false)) => {
            warn!(path = %path.display(), "lock was no longer held by this owner at release");
            Ok(value)
        }
        (Ok(_), Err(release_err)) => Err(release_err.into()),
    }
}
