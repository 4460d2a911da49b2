//! Directory-based cross-process lock.
//!
//! # Lock Directories
//!
//! A lock is a single path. A directory at that path means "held"; no
//! directory means "free". Directories are created with `create_dir`, which
//! fails if the path exists, so exactly one process wins any race. Mutual
//! exclusion is only as strong as the filesystem's atomic `mkdir`; some
//! network filesystems do not provide it.
//!
//! # Ownership Marker
//!
//! The winner then creates one empty file inside the directory, named by its
//! decimal process id (e.g. `LOCK/12345`). A directory without exactly one
//! such marker is *corrupt*: release refuses to touch it and acquisition
//! reports it instead of guessing. Creating the directory and the marker are
//! two steps, so a crash in between leaves a corrupt lock that needs an
//! operator to remove it.
//!
//! # Stale Locks
//!
//! With stale recovery enabled, a contender that finds a lock whose owner
//! process no longer exists removes it and tries again. Removal starts by
//! renaming the dead owner's marker to a claim entry; only the contender whose
//! rename succeeds deletes the directory, so a lock that has already been
//! reclaimed and re-acquired is never removed by a slower contender.
//!
//! # RAII Guards
//!
//! [`LockGuard`] releases the lock when dropped. If release fails during
//! drop, a warning is logged but the program does not crash.

mod dir_lock;
mod guard;
mod marker;
mod operations;
mod types;


// Re-export public API
pub use dir_lock::DirLock;
pub use guard::{LockGuard, run_locked, with_lock};
pub use marker::{Corruption, LockOwner, inspect_owner};
pub use operations::{
    acquire, acquire_timeout, acquire_timeout_with, acquire_with, force_release, release,
    try_acquire, try_acquire_with,
};
pub use types::{LockInfo, LockState, format_age};
