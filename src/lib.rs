//! dirlock: cross-process mutual exclusion built on atomic directory creation.
//!
//! A lock is a directory; whoever creates it holds the lock and records its
//! process id as the name of a single empty file inside. Locks left behind by
//! processes that no longer exist can be detected and reclaimed.
//!
//! ```no_run
//! use dirlock::config::LockConfig;
//! use dirlock::locks::LockGuard;
//!
//! let guard = LockGuard::acquire(LockConfig::new("state/LOCK"))?;
//! // ... exclusive section ...
//! guard.release()?;
//! # Ok::<(), dirlock::error::DirlockError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod liveness;
pub mod locks;

#[cfg(test)]
pub(crate) mod test_support;
