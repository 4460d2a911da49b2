//! Implementation of the `dirlock acquire` command.

use crate::cli::AcquireArgs;
use dirlock::error::{DirlockError, Result};
use dirlock::exit_codes;
use dirlock::locks::DirLock;
use std::path::PathBuf;
use std::time::Duration;

/// Execute the `dirlock acquire` command.
///
/// # Returns
///
/// * `Ok(SUCCESS)` - Lock acquired for `--pid`
/// * `Err(DirlockError::Held)` - Still held after `--no-wait` or `--timeout-ms` (exit code 2)
pub fn cmd_acquire(lock: PathBuf, args: AcquireArgs) -> Result<i32> {
    let config = args.wait.to_config(lock, args.pid);
    let mut lock = DirLock::new(config)?;

    let acquired = if args.no_wait {
        lock.try_acquire()?
    } else if let Some(timeout_ms) = args.timeout_ms {
        lock.acquire_timeout(Duration::from_millis(timeout_ms))?
    } else {
        lock.acquire()?;
        true
    };

    if !acquired {
        return Err(DirlockError::Held(format!(
            "lock '{}' is held by another process",
            lock.path().display()
        )));
    }

    println!("Acquired {} for pid {}", lock.path().display(), lock.pid());
    Ok(exit_codes::SUCCESS)
}
