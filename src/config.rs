//! Lock configuration for dirlock.
//!
//! This module defines `LockConfig`, the full set of parameters a lock
//! instance is built from: where the lock directory lives, which process id
//! it is taken on behalf of, how long to wait between attempts, and whether
//! locks left behind by dead owners are reclaimed.
//!
//! The struct deserializes with serde so embedding applications can carry it
//! in their own configuration files. Missing fields take their defaults.

use crate::error::{DirlockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lock directory name used when no explicit path is given.
pub const DEFAULT_LOCK_NAME: &str = "LOCK";

/// Pause between acquisition attempts in blocking acquire.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Resolve a lock root from a directory and a lock name.
///
/// An empty `dir` or `"."` yields the bare `name`, i.e. a path relative to the
/// current working directory.
pub fn lock_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() || dir == Path::new(".") {
        PathBuf::from(name)
    } else {
        dir.join(name)
    }
}

/// Parameters for a single lock instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Path of the lock directory (default: `LOCK` in the current directory).
    pub path: PathBuf,

    /// Process id recorded in the ownership marker (default: this process).
    pub pid: u32,

    /// Pause between attempts while blocking (default: 1s).
    #[serde(rename = "retry_interval_ms", with = "duration_ms")]
    pub retry_interval: Duration,

    /// Whether locks whose owner is dead are reclaimed (default: true).
    pub recover_stale: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOCK_NAME),
            pid: std::process::id(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            recover_stale: true,
        }
    }
}

impl LockConfig {
    /// Create a config for the lock at `path` with default settings.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Take the lock on behalf of `pid` instead of this process.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Set the pause between blocking acquisition attempts.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Enable or disable reclaiming locks held by dead owners.
    pub fn with_recover_stale(mut self, recover_stale: bool) -> Self {
        self.recover_stale = recover_stale;
        self
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `pid` must not be 0
    /// - `path` must name a directory entry (not `/` or empty)
    pub fn validate(&self) -> Result<()> {
        if self.pid == 0 {
            return Err(DirlockError::InvalidArgument(
                "process id 0 is never a valid lock owner".to_string(),
            ));
        }

        if self.path.file_name().is_none() {
            return Err(DirlockError::InvalidArgument(format!(
                "lock path '{}' does not name a directory entry",
                self.path.display()
            )));
        }

        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
