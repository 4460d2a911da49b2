//! Lock state and inspection report types.

use super::marker::{self, LockOwner, inspect_owner};
use crate::error::Result;
use crate::liveness::LivenessOracle;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a lock instance knows about its own lock.
///
/// "Held by another process" is deliberately not a state: it is only ever
/// observed transiently on disk during an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// This instance does not hold the lock.
    Unheld,
    /// This instance created the lock directory and its marker.
    HeldByThis,
    /// An operation failed midway; the on-disk state must be re-inspected.
    Unknown,
}

/// Diagnostic snapshot of a lock directory.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The lock directory path.
    pub path: PathBuf,

    /// Ownership as found on disk.
    pub owner: LockOwner,

    /// When the ownership marker was written, if held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<DateTime<Utc>>,

    /// Whether the owner process exists, if held by a valid pid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_alive: Option<bool>,
}

impl LockInfo {
    /// Inspect the lock at `lock_root`, probing the owner with `liveness`.
    pub fn inspect<P: AsRef<Path>, L: LivenessOracle + ?Sized>(
        lock_root: P,
        liveness: &L,
    ) -> Result<Self> {
        let path = lock_root.as_ref().to_path_buf();
        let owner = inspect_owner(&path)?;

        let (acquired_at, owner_alive) = match owner {
            LockOwner::Pid(pid) => (
                marker::marker_created_at(&path, pid)?,
                Some(liveness.is_alive(i64::from(pid))?),
            ),
            LockOwner::Absent | LockOwner::Corrupt(_) => (None, None),
        };

        Ok(Self {
            path,
            owner,
            acquired_at,
            owner_alive,
        })
    }

    /// Whether a lock directory exists at all.
    pub fn is_held(&self) -> bool {
        self.owner != LockOwner::Absent
    }

    /// Whether the recorded owner is known to be dead.
    pub fn is_stale(&self) -> bool {
        self.owner_alive == Some(false)
    }

    /// How long the current owner has held the lock.
    pub fn age(&self) -> Option<Duration> {
        self.acquired_at
            .map(|at| Utc::now().signed_duration_since(at))
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> Option<String> {
        self.age().map(format_age)
    }
}

/// Format a duration as `Xd Yh`, `Xh Ym` or `Xm`.
pub fn format_age(age: Duration) -> String {
    let age = age.max(Duration::zero());
    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.owner {
            LockOwner::Absent => write!(f, "{}: free", self.path.display()),
            LockOwner::Pid(pid) => write!(
                f,
                "{}: held by pid {} (age: {}{})",
                self.path.display(),
                pid,
                self.age_string().as_deref().unwrap_or("unknown"),
                if self.is_stale() { ", STALE" } else { "" }
            ),
            LockOwner::Corrupt(corruption) => {
                write!(f, "{}: CORRUPT ({})", self.path.display(), corruption)
            }
        }
    }
}
