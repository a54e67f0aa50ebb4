//! Snapshot store
//!
//! Layout of the destination directory:
//!
//! ```text
//! <dest>/<set>/2023-01-02/
//! <dest>/<set>/2023-01-03/
//! <dest>/<set>/current -> 2023-01-03
//! ```
//!
//! The archiver always writes into `current`; a full backup first creates
//! the day's directory and repoints `current` at it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::file_io::replace_symlink_atomic;
use crate::error::{BackupError, BackupResult};
use crate::models::{format_snapshot_date, parse_snapshot_date, Snapshot};

/// Name of the pointer to a set's most recent snapshot
pub const CURRENT_LINK: &str = "current";

/// Access to the dated snapshot directories of backup sets
pub trait SnapshotStore {
    /// Dated snapshot directories of a set, in listing order
    ///
    /// A set that was never backed up has no snapshots.
    fn list_dated_subdirs(&self, set: &str) -> BackupResult<Vec<Snapshot>>;

    /// Delete a snapshot directory and everything in it
    fn remove(&self, path: &Path) -> BackupResult<()>;

    /// Point the set's `current` pointer at a snapshot directory
    fn set_current_pointer(&self, set: &str, target: &Path) -> BackupResult<()>;

    /// Create the snapshot directory for `date` if missing
    fn create_dated_dir(&self, set: &str, date: NaiveDate) -> BackupResult<PathBuf>;

    /// Whether the set has a `current` snapshot to back up into
    fn current_exists(&self, set: &str) -> bool;
}

/// Filesystem-backed snapshot store rooted at the destination directory
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dest_dir: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }

    /// Destination directory
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Directory holding a set's snapshots
    pub fn set_dir(&self, set: &str) -> PathBuf {
        self.dest_dir.join(set)
    }

    /// The set's `current` pointer, where the archiver writes
    pub fn current_link(&self, set: &str) -> PathBuf {
        self.set_dir(set).join(CURRENT_LINK)
    }

    /// Directory `current` points at, if any
    pub fn current_target(&self, set: &str) -> Option<PathBuf> {
        let target = fs::read_link(self.current_link(set)).ok()?;
        Some(self.set_dir(set).join(target))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn list_dated_subdirs(&self, set: &str) -> BackupResult<Vec<Snapshot>> {
        let dir = self.set_dir(set);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let listing_error = |e: std::io::Error| BackupError::Listing {
            set: set.to_string(),
            reason: format!("{}: {}", dir.display(), e),
        };

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&dir).map_err(listing_error)? {
            let entry = entry.map_err(listing_error)?;
            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(parse_snapshot_date) else {
                continue;
            };

            // Symlinks with a date name are not snapshots of their own
            let is_dir = entry.file_type().map_err(listing_error)?.is_dir();
            if is_dir {
                snapshots.push(Snapshot::new(entry.path(), date));
            }
        }

        Ok(snapshots)
    }

    fn remove(&self, path: &Path) -> BackupResult<()> {
        fs::remove_dir_all(path).map_err(|e| BackupError::Removal {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn set_current_pointer(&self, set: &str, target: &Path) -> BackupResult<()> {
        // Relative targets keep the store relocatable
        let relative = target.strip_prefix(self.set_dir(set)).unwrap_or(target);
        replace_symlink_atomic(relative, &self.current_link(set))
    }

    fn create_dated_dir(&self, set: &str, date: NaiveDate) -> BackupResult<PathBuf> {
        let dir = self.set_dir(set).join(format_snapshot_date(date));
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                BackupError::Io(format!("Error creating directory {}: {}", dir.display(), e))
            })?;
        }
        Ok(dir)
    }

    fn current_exists(&self, set: &str) -> bool {
        self.current_link(set).exists()
    }
}
