//! Lock acquisition, release, and stale-lock reclamation.
//!
//! Every function here is a fresh probe of the filesystem; nothing is cached
//! between calls. Each has a `_with` variant taking an explicit liveness
//! oracle, and a plain variant that probes the host process table.

use super::marker::{LockOwner, inspect_owner, marker_name};
use crate::error::{DirlockError, Result};
use crate::fs::remove_dir_atomic;
use crate::liveness::{LivenessOracle, SystemLiveness};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How many times a corrupt lock is inspected before giving up.
const CORRUPT_SETTLE_ATTEMPTS: u32 = 5;

/// Pause between inspections of a corrupt lock.
const CORRUPT_SETTLE_DELAY: Duration = Duration::from_millis(20);

/// Make one attempt to acquire the lock at `lock_root` for `owner_pid`.
///
/// # Returns
///
/// * `Ok(true)` - Lock directory and marker created
/// * `Ok(false)` - Lock held by a live owner (or by anyone, without recovery)
/// * `Err(DirlockError::Corrupt)` - Recovery enabled but the existing lock has
///   no usable owner
/// * `Err(DirlockError::Os)` - Unexpected filesystem or probe failure
pub fn try_acquire<P: AsRef<Path>>(
    lock_root: P,
    owner_pid: u32,
    recover_stale: bool,
) -> Result<bool> {
    try_acquire_with(lock_root, owner_pid, recover_stale, &SystemLiveness)
}

/// [`try_acquire`] with an explicit liveness oracle.
pub fn try_acquire_with<P: AsRef<Path>, L: LivenessOracle + ?Sized>(
    lock_root: P,
    owner_pid: u32,
    recover_stale: bool,
    liveness: &L,
) -> Result<bool> {
    let lock_root = lock_root.as_ref();
    validate_owner(owner_pid)?;

    loop {
        match fs::create_dir(lock_root) {
            Ok(()) => {
                write_marker(lock_root, owner_pid)?;
                debug!(path = %lock_root.display(), pid = owner_pid, "acquired lock");
                return Ok(true);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(DirlockError::os(
                    format!("failed to create lock directory '{}'", lock_root.display()),
                    e,
                ));
            }
        }

        if !recover_stale {
            debug!(path = %lock_root.display(), "lock is held");
            return Ok(false);
        }

        match settled_owner(lock_root)? {
            LockOwner::Absent => {
                debug!(path = %lock_root.display(), "lock released during attempt, retrying");
            }
            LockOwner::Pid(holder) => {
                if liveness.is_alive(i64::from(holder))? {
                    debug!(path = %lock_root.display(), holder, "lock is held by live owner");
                    return Ok(false);
                }
                debug!(path = %lock_root.display(), holder, "owner is dead, reclaiming stale lock");
                let reclaimed = claim_and_remove(lock_root, holder, owner_pid)?;
                debug!(path = %lock_root.display(), holder, reclaimed, "stale lock reclamation");
            }
            LockOwner::Corrupt(corruption) => {
                warn!(path = %lock_root.display(), %corruption, "refusing to reclaim corrupt lock");
                return Err(DirlockError::Corrupt {
                    path: lock_root.to_path_buf(),
                    corruption,
                });
            }
        }
    }
}

/// Block until the lock at `lock_root` is acquired for `owner_pid`.
///
/// Stale locks are reclaimed. There is no upper bound on the wait; use
/// [`acquire_timeout`] for a bounded wait. Any error ends the wait.
pub fn acquire<P: AsRef<Path>>(
    lock_root: P,
    owner_pid: u32,
    retry_interval: Duration,
) -> Result<()> {
    acquire_with(lock_root, owner_pid, retry_interval, &SystemLiveness)
}

/// [`acquire`] with an explicit liveness oracle.
pub fn acquire_with<P: AsRef<Path>, L: LivenessOracle + ?Sized>(
    lock_root: P,
    owner_pid: u32,
    retry_interval: Duration,
    liveness: &L,
) -> Result<()> {
    poll_acquire(lock_root.as_ref(), owner_pid, true, retry_interval, None, liveness).map(|_| ())
}

/// Like [`acquire`], but give up once `timeout` has elapsed.
///
/// # Returns
///
/// * `Ok(true)` - Lock acquired
/// * `Ok(false)` - Still held by a live owner when the timeout expired
pub fn acquire_timeout<P: AsRef<Path>>(
    lock_root: P,
    owner_pid: u32,
    retry_interval: Duration,
    timeout: Duration,
) -> Result<bool> {
    acquire_timeout_with(lock_root, owner_pid, retry_interval, timeout, &SystemLiveness)
}

/// [`acquire_timeout`] with an explicit liveness oracle.
pub fn acquire_timeout_with<P: AsRef<Path>, L: LivenessOracle + ?Sized>(
    lock_root: P,
    owner_pid: u32,
    retry_interval: Duration,
    timeout: Duration,
    liveness: &L,
) -> Result<bool> {
    let deadline = Instant::now() + timeout;
    poll_acquire(
        lock_root.as_ref(),
        owner_pid,
        true,
        retry_interval,
        Some(deadline),
        liveness,
    )
}

/// Retry [`try_acquire_with`] every `retry_interval` until it succeeds, fails,
/// or `deadline` passes.
pub(crate) fn poll_acquire<L: LivenessOracle + ?Sized>(
    lock_root: &Path,
    owner_pid: u32,
    recover_stale: bool,
    retry_interval: Duration,
    deadline: Option<Instant>,
    liveness: &L,
) -> Result<bool> {
    loop {
        if try_acquire_with(lock_root, owner_pid, recover_stale, liveness)? {
            return Ok(true);
        }

        let pause = match deadline {
            None => retry_interval,
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    debug!(
                        path = %lock_root.display(),
                        pid = owner_pid,
                        "gave up waiting for lock"
                    );
                    return Ok(false);
                }
                retry_interval.min(deadline - now)
            }
        };
        thread::sleep(pause);
    }
}

/// Release the lock at `lock_root` if, and only if, `owner_pid` owns it.
///
/// # Returns
///
/// * `Ok(true)` - Lock directory removed
/// * `Ok(false)` - No lock, a corrupt lock, or a lock owned by someone else;
///   nothing is deleted
pub fn release<P: AsRef<Path>>(lock_root: P, owner_pid: u32) -> Result<bool> {
    let lock_root = lock_root.as_ref();
    validate_owner(owner_pid)?;

    match inspect_owner(lock_root)? {
        LockOwner::Pid(holder) if holder == owner_pid => {
            let removed = remove_dir_atomic(lock_root)?;
            debug!(path = %lock_root.display(), pid = owner_pid, removed, "released lock");
            Ok(removed)
        }
        LockOwner::Pid(holder) => {
            debug!(
                path = %lock_root.display(),
                pid = owner_pid,
                holder,
                "not releasing lock owned by another process"
            );
            Ok(false)
        }
        LockOwner::Absent => Ok(false),
        LockOwner::Corrupt(corruption) => {
            warn!(path = %lock_root.display(), %corruption, "not releasing corrupt lock");
            Ok(false)
        }
    }
}

/// Remove the lock at `lock_root` regardless of who owns it.
///
/// Meant for locks whose owner is known to be dead. A corrupt lock is left
/// untouched: its state is uncertain and it may belong to a live process.
///
/// # Returns
///
/// * `Ok(true)` - Lock directory removed
/// * `Ok(false)` - No lock, or a corrupt lock
pub fn force_release<P: AsRef<Path>>(lock_root: P) -> Result<bool> {
    let lock_root = lock_root.as_ref();

    match inspect_owner(lock_root)? {
        LockOwner::Pid(holder) => {
            let removed = claim_and_remove(lock_root, holder, std::process::id())?;
            debug!(path = %lock_root.display(), holder, removed, "force-released lock");
            Ok(removed)
        }
        LockOwner::Absent => Ok(false),
        LockOwner::Corrupt(corruption) => {
            warn!(path = %lock_root.display(), %corruption, "not force-releasing corrupt lock");
            Ok(false)
        }
    }
}

/// Remove the lock whose marker names `holder`, on behalf of `claimant`.
///
/// The marker is first renamed to a claim entry. Renaming is the
/// compare-and-swap: it succeeds for exactly one caller, and only for the
/// lock directory that still carries `holder`'s marker. Every other caller
/// gets `Ok(false)` and nothing is deleted. While claimed, the lock looks
/// corrupt to observers, which wait for it to settle.
pub(super) fn claim_and_remove(lock_root: &Path, holder: u32, claimant: u32) -> Result<bool> {
    let marker = lock_root.join(marker_name(holder));
    let claim = lock_root.join(claim_name(claimant));

    match fs::rename(&marker, &claim) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %lock_root.display(), holder, "lock already claimed by another caller");
            return Ok(false);
        }
        Err(e) => {
            return Err(DirlockError::os(
                format!("failed to claim lock '{}'", lock_root.display()),
                e,
            ));
        }
    }

    match remove_dir_atomic(lock_root) {
        Ok(removed) => Ok(removed),
        Err(e) => {
            // Put the marker back so the lock is not left corrupt.
            let _ = fs::rename(&claim, &marker);
            Err(e)
        }
    }
}

/// Name of the entry a claimed marker is renamed to.
fn claim_name(claimant: u32) -> String {
    format!(".claimed-by-{}", claimant)
}

/// Inspect the owner, giving a winner that has not yet written its marker, or
/// a claimant that has not yet removed a claimed lock, a brief chance to
/// finish.
fn settled_owner(lock_root: &Path) -> Result<LockOwner> {
    let mut owner = inspect_owner(lock_root)?;
    for _ in 1..CORRUPT_SETTLE_ATTEMPTS {
        if !matches!(owner, LockOwner::Corrupt(_)) {
            break;
        }
        thread::sleep(CORRUPT_SETTLE_DELAY);
        owner = inspect_owner(lock_root)?;
    }
    Ok(owner)
}

/// Create the empty ownership marker inside a freshly created lock directory.
///
/// On failure the (still empty) directory is removed so the lock is not left
/// corrupt.
fn write_marker(lock_root: &Path, owner_pid: u32) -> Result<()> {
    let marker = lock_root.join(marker_name(owner_pid));

    if let Err(e) = OpenOptions::new().write(true).create_new(true).open(&marker) {
        let _ = fs::remove_dir(lock_root);
        return Err(DirlockError::os(
            format!("failed to write ownership marker '{}'", marker.display()),
            e,
        ));
    }

    Ok(())
}

fn validate_owner(owner_pid: u32) -> Result<()> {
    if owner_pid == 0 {
        return Err(DirlockError::InvalidArgument(
            "process id 0 is never a valid lock owner".to_string(),
        ));
    }
    Ok(())
}
