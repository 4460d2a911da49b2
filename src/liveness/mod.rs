//! Process liveness oracle.
//!
//! Answers one question for the lock protocol: does a process with this id
//! currently exist on the host? Existence is what matters, not accessibility:
//! a process we are not permitted to inspect is still reported alive.
//!
//! The probe is the only platform-specific part of dirlock. The backend is
//! chosen at build time:
//! - **POSIX**: `kill(pid, 0)`; `ESRCH` means gone, `EPERM` means alive.
//! - **Windows**: `OpenProcess` + `GetExitCodeProcess`.

use crate::error::{DirlockError, Result};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use self::unix as platform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use self::windows as platform;

/// Capability to ask whether a process exists.
///
/// The lock engine is generic over this trait so tests can script which
/// owners are alive.
pub trait LivenessOracle {
    /// Report whether a process with `pid` currently exists.
    fn is_alive(&self, pid: i64) -> Result<bool>;
}

impl<T: LivenessOracle + ?Sized> LivenessOracle for &T {
    fn is_alive(&self, pid: i64) -> Result<bool> {
        (**self).is_alive(pid)
    }
}

/// Liveness oracle backed by the host process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLiveness;

impl LivenessOracle for SystemLiveness {
    fn is_alive(&self, pid: i64) -> Result<bool> {
        is_alive(pid)
    }
}

/// Probe the host process table for `pid`.
///
/// # Returns
///
/// * `Ok(false)` - `pid` is negative, out of range, or names no process
/// * `Ok(true)` - the process exists (including when access is denied)
/// * `Err(DirlockError::InvalidArgument)` - `pid` is 0
/// * `Err(DirlockError::Os)` - the probe failed for any other reason
pub fn is_alive(pid: i64) -> Result<bool> {
    if pid < 0 {
        return Ok(false);
    }
    if pid == 0 {
        return Err(DirlockError::InvalidArgument(
            "process id 0 does not identify a single process".to_string(),
        ));
    }
    platform::process_exists(pid)
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use crate::error::{DirlockError, Result};
    use std::io;

    pub(super) fn process_exists(pid: i64) -> Result<bool> {
        Err(DirlockError::os(
            format!("cannot probe process {} on this platform", pid),
            io::Error::from(io::ErrorKind::Unsupported),
        ))
    }
}
