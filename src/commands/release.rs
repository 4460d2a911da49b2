//! Implementation of the `dirlock release` and `dirlock force-release` commands.

use crate::cli::ReleaseArgs;
use dirlock::error::{DirlockError, Result};
use dirlock::exit_codes;
use dirlock::locks::{self, LockOwner};
use std::path::{Path, PathBuf};

/// Execute the `dirlock release` command.
pub fn cmd_release(lock: PathBuf, args: ReleaseArgs) -> Result<i32> {
    if locks::release(&lock, args.pid)? {
        println!("Released {}", lock.display());
        return Ok(exit_codes::SUCCESS);
    }

    Err(explain_refusal(&lock, Some(args.pid))?)
}

/// Execute the `dirlock force-release` command.
pub fn cmd_force_release(lock: &Path) -> Result<i32> {
    if locks::force_release(lock)? {
        println!("Force-released {}", lock.display());
        return Ok(exit_codes::SUCCESS);
    }

    Err(explain_refusal(lock, None)?)
}

/// Build the error describing why a release removed nothing.
fn explain_refusal(lock: &Path, pid: Option<u32>) -> Result<DirlockError> {
    let err = match locks::inspect_owner(lock)? {
        LockOwner::Absent => DirlockError::NotHeld(format!(
            "lock '{}' does not exist",
            lock.display()
        )),
        LockOwner::Pid(holder) => DirlockError::Held(match pid {
            Some(pid) => format!(
                "lock '{}' is held by pid {}, not {}",
                lock.display(),
                holder,
                pid
            ),
            None => format!("lock '{}' changed hands during release", lock.display()),
        }),
        LockOwner::Corrupt(corruption) => DirlockError::Corrupt {
            path: lock.to_path_buf(),
            corruption,
        },
    };
    Ok(err)
}
