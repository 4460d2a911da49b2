//! POSIX liveness probe.

use crate::error::{DirlockError, Result};
use std::io;

/// Check for a process with `kill(pid, 0)`.
pub(super) fn process_exists(pid: i64) -> Result<bool> {
    // Larger ids cannot be represented as pid_t, so no such process exists.
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return Ok(false);
    };

    // SAFETY: signal 0 only performs existence and permission checks.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return Ok(true);
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Ok(false),
        Some(libc::EPERM) => Ok(true),
        _ => Err(DirlockError::os(
            format!("failed to probe process {}", pid),
            err,
        )),
    }
}
