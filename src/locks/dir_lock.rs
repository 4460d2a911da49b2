//! Stateful lock handle.

use super::guard::LockGuard;
use super::marker::{LockOwner, inspect_owner};
use super::operations;
use super::types::{LockInfo, LockState};
use crate::config::LockConfig;
use crate::error::Result;
use crate::liveness::{LivenessOracle, SystemLiveness};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A lock directory bound to one owner pid.
///
/// Tracks what this instance knows about its own ownership (see
/// [`LockState`]). The filesystem remains the source of truth; every method
/// probes it afresh.
#[derive(Debug)]
pub struct DirLock<L = SystemLiveness> {
    path: PathBuf,
    pid: u32,
    retry_interval: Duration,
    recover_stale: bool,
    liveness: L,
    state: LockState,
}

impl DirLock<SystemLiveness> {
    /// Create a lock handle from `config`, probing owners with the host
    /// process table.
    pub fn new(config: LockConfig) -> Result<Self> {
        Self::with_liveness(config, SystemLiveness)
    }
}

impl<L> DirLock<L> {
    /// Create a lock handle from `config` with a custom liveness oracle.
    pub fn with_liveness(config: LockConfig, liveness: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            path: config.path,
            pid: config.pid,
            retry_interval: config.retry_interval,
            recover_stale: config.recover_stale,
            liveness,
            state: LockState::Unheld,
        })
    }

    /// Path of the lock directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Owner pid this handle acquires and releases as.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// What this handle last observed about its own ownership.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Release the lock if this handle's pid owns it.
    pub fn release(&mut self) -> Result<bool> {
        let result = operations::release(&self.path, self.pid);
        self.state = match result {
            Ok(_) => LockState::Unheld,
            Err(_) => LockState::Unknown,
        };
        result
    }

    /// Remove the lock regardless of owner. Refuses corrupt locks.
    pub fn force_release(&mut self) -> Result<bool> {
        let result = operations::force_release(&self.path);
        match result {
            Ok(true) => self.state = LockState::Unheld,
            Ok(false) => {}
            Err(_) => self.state = LockState::Unknown,
        }
        result
    }

    /// Read the current owner from disk.
    pub fn owner(&self) -> Result<LockOwner> {
        inspect_owner(&self.path)
    }
}

impl<L: LivenessOracle> DirLock<L> {
    /// Make one acquisition attempt.
    pub fn try_acquire(&mut self) -> Result<bool> {
        let result =
            operations::try_acquire_with(&self.path, self.pid, self.recover_stale, &self.liveness);
        self.track_acquire(result)
    }

    /// Block until acquired, polling every retry interval.
    pub fn acquire(&mut self) -> Result<()> {
        self.poll(None).map(|_| ())
    }

    /// Block until acquired or `timeout` elapses.
    pub fn acquire_timeout(&mut self, timeout: Duration) -> Result<bool> {
        self.poll(Some(Instant::now() + timeout))
    }

    /// Diagnostic snapshot of the lock.
    pub fn info(&self) -> Result<LockInfo> {
        LockInfo::inspect(&self.path, &self.liveness)
    }

    /// Acquire the lock (blocking) and wrap it in a guard that releases on drop.
    pub fn guard(mut self) -> Result<LockGuard<L>> {
        self.acquire()?;
        Ok(LockGuard::new(self))
    }

    /// Acquire the lock if it is free right now.
    ///
    /// Returns `Ok(None)` when the lock is held by a live owner.
    pub fn try_guard(mut self) -> Result<Option<LockGuard<L>>> {
        if self.try_acquire()? {
            Ok(Some(LockGuard::new(self)))
        } else {
            Ok(None)
        }
    }

    fn poll(&mut self, deadline: Option<Instant>) -> Result<bool> {
        let result = operations::poll_acquire(
            &self.path,
            self.pid,
            self.recover_stale,
            self.retry_interval,
            deadline,
            &self.liveness,
        );
        self.track_acquire(result)
    }

    fn track_acquire(&mut self, result: Result<bool>) -> Result<bool> {
        match result {
            Ok(true) => self.state = LockState::HeldByThis,
            Ok(false) => {}
            Err(_) => self.state = LockState::Unknown,
        }
        result
    }
}
