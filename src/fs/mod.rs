//! Filesystem utilities for dirlock.
//!
//! The lock protocol itself only needs `create_dir`, `read_dir` and file
//! creation from std. This module holds the one compound operation that needs
//! care: removing a lock directory without ever exposing a half-deleted state.

mod remove;

pub use remove::remove_dir_atomic;
