//! Implementation of the `dirlock run` command.

use crate::cli::RunArgs;
use dirlock::error::{DirlockError, Result};
use dirlock::exit_codes;
use dirlock::locks::{DirLock, run_locked};
use std::path::PathBuf;
use std::process::Command;

/// Execute the `dirlock run` command.
///
/// Holds the lock (owned by this process) for the lifetime of the child and
/// returns the child's exit code. A child killed by a signal maps to
/// `OS_FAILURE`.
pub fn cmd_run(lock: PathBuf, args: RunArgs) -> Result<i32> {
    let config = args.wait.to_config(lock, std::process::id());
    let lock = DirLock::new(config)?;

    run_locked(lock, || run_child(&args.command))
}

fn run_child(command: &[String]) -> Result<i32> {
    let (program, rest) = command
        .split_first()
        .ok_or_else(|| DirlockError::InvalidArgument("no command given".to_string()))?;

    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|e| DirlockError::os(format!("failed to run '{}'", program), e))?;

    Ok(status.code().unwrap_or(exit_codes::OS_FAILURE))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_child_reports_exit_code() {
        assert_eq!(run_child(&["true".to_string()]).unwrap(), 0);
        assert_eq!(run_child(&["false".to_string()]).unwrap(), 1);
    }

    #[test]
    fn run_child_missing_program_is_os_failure() {
        let err = run_child(&["dirlock-no-such-program".to_string()]).unwrap_err();
        assert!(matches!(err, DirlockError::Os { .. }));
    }

    #[test]
    fn run_child_rejects_empty_command() {
        let err = run_child(&[]).unwrap_err();
        assert!(matches!(err, DirlockError::InvalidArgument(_)));
    }
}
