//! Implementation of the `dirlock status` command.

use crate::cli::StatusArgs;
use dirlock::error::Result;
use dirlock::exit_codes;
use dirlock::liveness::SystemLiveness;
use dirlock::locks::LockInfo;
use std::path::Path;

/// Execute the `dirlock status` command.
///
/// Always succeeds when the lock can be inspected; the report itself tells
/// whether the lock is free, held, stale, or corrupt.
pub fn cmd_status(lock: &Path, args: StatusArgs) -> Result<i32> {
    let info = LockInfo::inspect(lock, &SystemLiveness)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
        if info.is_stale() {
            println!("The owner is no longer running; the next acquire will reclaim this lock.");
        }
    }

    Ok(exit_codes::SUCCESS)
}
