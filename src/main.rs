//! dirlock: command-line access to directory-based cross-process locks.
//!
//! This is the main entry point for the `dirlock` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use dirlock::exit_codes;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `dirlock=debug`).
const LOG_ENV: &str = "DIRLOCK_LOG";

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(code) => ExitCode::from(clamp_exit_code(code)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(clamp_exit_code(err.exit_code()))
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("dirlock=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn clamp_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(exit_codes::OS_FAILURE as u8)
}
