//! Backup orchestration for flexbackup-manager
//!
//! # Architecture
//!
//! - `BackupManager`: runs a day's schedule through a [`BackupRunner`]
//!   and then enforces retention
//! - `RetentionGc`: keeps the most recent dated snapshots of each set
//!
//! # Retention Policy
//!
//! By default the system keeps:
//! - 2 snapshots per tier-1 backup set
//! - 1 snapshot per tier-2 backup set
//!
//! Garbage collection covers every configured set on every invocation,
//! whether or not the set was backed up that day.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexbackup::backup::BackupManager;
//! use flexbackup::runner::FlexbackupRunner;
//! use flexbackup::schedule::SystemClock;
//! use flexbackup::storage::FsSnapshotStore;
//!
//! let runner = FlexbackupRunner::new(&config, false)?;
//! let store = FsSnapshotStore::new(&config.dest_directory);
//! let report = BackupManager::new(&config, &runner, &store).run(&SystemClock)?;
//! ```
//!
//! [`BackupRunner`]: crate::runner::BackupRunner

mod manager;
mod retention;

pub use manager::{BackupManager, RunReport, SetFailure, SetRun};
pub use retention::{select_stale, GcOverview, GcPreview, GcReport, RetentionGc};
