//! Exit code constants for the dirlock CLI.
//!
//! - 0: Success
//! - 1: Usage error (bad arguments, invalid pid)
//! - 2: Lock held by another owner, or release by a non-owner
//! - 3: Corrupt lock directory
//! - 4: Unexpected filesystem or process-table failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Usage error: bad arguments or an invalid owner pid.
pub const USER_ERROR: i32 = 1;

/// Lock is held by a live owner, or the caller does not own it.
pub const LOCK_HELD: i32 = 2;

/// Lock directory does not hold exactly one valid ownership marker.
pub const CORRUPT_LOCK: i32 = 3;

/// Filesystem or process probe failed unexpectedly.
pub const OS_FAILURE: i32 = 4;
