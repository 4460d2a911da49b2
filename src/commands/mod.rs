//! Command implementations for dirlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler returns the process exit code on success;
//! failures are `DirlockError`s mapped to exit codes by `main`.

mod acquire;
mod release;
mod run;
mod status;

use crate::cli::{Cli, Command};
use dirlock::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Status(args) => status::cmd_status(&cli.lock, args),
        Command::Acquire(args) => acquire::cmd_acquire(cli.lock, args),
        Command::Release(args) => release::cmd_release(cli.lock, args),
        Command::ForceRelease => release::cmd_force_release(&cli.lock),
        Command::Run(args) => run::cmd_run(cli.lock, args),
    }
}
