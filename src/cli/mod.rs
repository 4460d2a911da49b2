//! CLI argument parsing for dirlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use dirlock::config::{DEFAULT_LOCK_NAME, LockConfig};
use std::path::PathBuf;
use std::time::Duration;

/// dirlock: cross-process locks built on atomic directory creation.
///
/// A lock is held while a directory exists at the lock path. The directory
/// contains a single empty file named by the owner's process id.
#[derive(Parser, Debug)]
#[command(name = "dirlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path of the lock directory.
    #[arg(short, long, global = true, default_value = DEFAULT_LOCK_NAME)]
    pub lock: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for dirlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show who holds the lock.
    ///
    /// Reports free, held (with owner pid, age, and whether the owner is
    /// still running), or corrupt.
    Status(StatusArgs),

    /// Acquire the lock on behalf of a process.
    ///
    /// The lock is recorded under --pid, typically the calling shell (`$$`),
    /// so it stays held after this command exits.
    Acquire(AcquireArgs),

    /// Release a lock held by a process.
    ///
    /// Fails if the lock is held by a different pid or is corrupt.
    Release(ReleaseArgs),

    /// Remove the lock regardless of its owner.
    ///
    /// Refuses to touch a corrupt lock directory.
    ForceRelease,

    /// Run a command while holding the lock.
    ///
    /// The lock is owned by this dirlock process and released when the
    /// command exits. Exits with the command's exit code.
    Run(RunArgs),
}

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Polling options shared by commands that wait for the lock.
#[derive(Args, Debug, Clone, Copy)]
pub struct WaitArgs {
    /// Milliseconds to wait between attempts.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Do not reclaim locks whose owner is no longer running.
    #[arg(long)]
    pub no_recover: bool,
}

impl WaitArgs {
    /// Build a lock config for `path` owned by `pid`.
    pub fn to_config(self, path: PathBuf, pid: u32) -> LockConfig {
        LockConfig::new(path)
            .with_pid(pid)
            .with_retry_interval(Duration::from_millis(self.interval_ms))
            .with_recover_stale(!self.no_recover)
    }
}

/// Arguments for the `acquire` command.
#[derive(Args, Debug)]
pub struct AcquireArgs {
    /// Process id to record as the owner.
    #[arg(long)]
    pub pid: u32,

    #[command(flatten)]
    pub wait: WaitArgs,

    /// Give up after this many milliseconds.
    #[arg(long, conflicts_with = "no_wait")]
    pub timeout_ms: Option<u64>,

    /// Make a single attempt instead of waiting.
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments for the `release` command.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Process id the lock is expected to be held by.
    #[arg(long)]
    pub pid: u32,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub wait: WaitArgs,

    /// Command and arguments to run.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "CMD")]
    pub command: Vec<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
