//! Storage layer for flexbackup-manager
//!
//! Provides the snapshot store the scheduler reads and prunes, plus file
//! helpers with atomic writes and atomic symlink replacement.

pub mod file_io;
pub mod snapshots;

pub use file_io::{replace_symlink_atomic, write_atomic, write_executable};
pub use snapshots::{FsSnapshotStore, SnapshotStore, CURRENT_LINK};
