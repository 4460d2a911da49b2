//! Windows liveness probe.

use crate::error::{DirlockError, Result};
use std::io;
use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_ACCESS_DENIED, ERROR_INVALID_PARAMETER, GetLastError, STILL_ACTIVE,
};
use windows_sys::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
};

/// Check for a process by opening a query handle to it.
///
/// `OpenProcess` fails with `ERROR_INVALID_PARAMETER` for unknown ids and
/// `ERROR_ACCESS_DENIED` for protected processes. An opened handle may still
/// refer to a process that has exited but not been reaped, so the exit code
/// is checked as well.
///
/// A process that exited with code 259 (`STILL_ACTIVE`) is indistinguishable
/// from a running one here and is reported alive. Its lock is then treated as
/// held until the last handle to the process is closed and the id vanishes.
pub(super) fn process_exists(pid: i64) -> Result<bool> {
    let Ok(pid) = u32::try_from(pid) else {
        return Ok(false);
    };

    // SAFETY: the handle is checked for null before use and closed exactly once.
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            return match GetLastError() {
                ERROR_INVALID_PARAMETER => Ok(false),
                ERROR_ACCESS_DENIED => Ok(true),
                code => Err(DirlockError::os(
                    format!("failed to open process {}", pid),
                    io::Error::from_raw_os_error(code as i32),
                )),
            };
        }

        let mut exit_code: u32 = 0;
        let queried = GetExitCodeProcess(handle, &mut exit_code);
        let query_error = (queried == 0).then(io::Error::last_os_error);
        CloseHandle(handle);

        match query_error {
            Some(err) => Err(DirlockError::os(
                format!("failed to query exit code of process {}", pid),
                err,
            )),
            None => Ok(exit_code == STILL_ACTIVE as u32),
        }
    }
}
