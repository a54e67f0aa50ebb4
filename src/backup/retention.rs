//! Snapshot garbage collection
//!
//! Keeps the N most recent dated snapshots of every backup set and deletes
//! the rest, oldest first. At least one snapshot always survives, whatever
//! retention count is passed in.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::BackupConfig;
use crate::error::BackupResult;
use crate::models::{Snapshot, Tier};
use crate::storage::SnapshotStore;

/// Split snapshots into the stale ones and the ones to keep
///
/// Snapshots are ordered by date, ties keeping their listing order. The
/// `retention` newest are kept (never fewer than one); the rest are stale,
/// oldest first.
pub fn select_stale(mut snapshots: Vec<Snapshot>, retention: u32) -> (Vec<Snapshot>, Vec<Snapshot>) {
    snapshots.sort_by_key(|s| s.date);
    let keep = (retention as usize).max(1);
    let excess = snapshots.len().saturating_sub(keep);
    let kept = snapshots.split_off(excess);
    (snapshots, kept)
}

/// Outcome of a garbage collection pass over all sets
#[derive(Debug, Clone, Default, Serialize)]
pub struct GcReport {
    /// Deleted snapshot directories, or the ones a dry run would delete
    pub removed: Vec<PathBuf>,
    /// Sets that had nothing to delete
    pub clean: Vec<String>,
    /// Sets whose snapshots could not be listed
    pub failed: Vec<String>,
    /// Sets left untouched because today's full backup of them failed
    pub held: Vec<String>,
}

impl GcReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Stale snapshot candidates of one set
#[derive(Debug, Clone, Serialize)]
pub struct GcPreview {
    pub set: String,
    pub tier: Tier,
    pub retention: u32,
    pub stale: Vec<Snapshot>,
    pub kept: Vec<Snapshot>,
}

/// Stale snapshot candidates of every set
#[derive(Debug, Clone, Default, Serialize)]
pub struct GcOverview {
    pub sets: Vec<GcPreview>,
    /// Sets whose snapshots could not be listed
    pub failed: Vec<String>,
}

impl GcOverview {
    pub fn stale_count(&self) -> usize {
        self.sets.iter().map(|p| p.stale.len()).sum()
    }
}

/// Retention enforcement over a snapshot store
pub struct RetentionGc<'a, S: SnapshotStore> {
    store: &'a S,
}

impl<'a, S: SnapshotStore> RetentionGc<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Snapshots of `set` that `collect` would delete, without deleting
    pub fn preview(&self, set: &str, retention: u32) -> BackupResult<(Vec<Snapshot>, Vec<Snapshot>)> {
        let snapshots = self.store.list_dated_subdirs(set)?;
        Ok(select_stale(snapshots, retention))
    }

    /// Delete the stale snapshots of one set
    ///
    /// Returns the deleted directories. A failed deletion stops immediately
    /// with [`BackupError::Removal`](crate::error::BackupError::Removal).
    pub fn collect(&self, set: &str, retention: u32) -> BackupResult<Vec<PathBuf>> {
        let (stale, _kept) = self.preview(set, retention)?;

        let mut removed = Vec::with_capacity(stale.len());
        for snapshot in stale {
            info!(set, path = %snapshot.path.display(), "Removing old backup");
            self.store.remove(&snapshot.path)?;
            removed.push(snapshot.path);
        }

        Ok(removed)
    }

    /// Collect every set of both tiers with its tier's retention
    ///
    /// A set whose snapshots cannot be listed is logged and skipped; a
    /// deletion failure aborts the pass.
    pub fn collect_all(&self, config: &BackupConfig) -> BackupResult<GcReport> {
        self.sweep(config, &[], false)
    }

    /// Like [`collect_all`](Self::collect_all), leaving the `held` sets alone
    pub fn collect_all_except(
        &self,
        config: &BackupConfig,
        held: &[String],
    ) -> BackupResult<GcReport> {
        self.sweep(config, held, false)
    }

    /// Report what [`collect_all_except`](Self::collect_all_except) would
    /// delete without deleting anything
    pub fn simulate_all(&self, config: &BackupConfig, held: &[String]) -> BackupResult<GcReport> {
        self.sweep(config, held, true)
    }

    fn sweep(&self, config: &BackupConfig, held: &[String], dry_run: bool) -> BackupResult<GcReport> {
        debug!(dry_run, "Doing backup garbage collection");
        let mut report = GcReport::default();

        for tier in Tier::ALL {
            let retention = config.retention.for_tier(tier);
            for set in config.sets(tier) {
                if held.contains(&set) {
                    warn!(set = %set, "Skipping garbage collection: today's full backup failed");
                    report.held.push(set);
                    continue;
                }

                let outcome = if dry_run {
                    self.preview(&set, retention)
                        .map(|(stale, _)| stale.into_iter().map(|s| s.path).collect())
                } else {
                    self.collect(&set, retention)
                };

                match outcome {
                    Ok(removed) if removed.is_empty() => {
                        info!(set = %set, "No stale dataset detected during GC");
                        report.clean.push(set);
                    }
                    Ok(removed) => report.removed.extend(removed),
                    Err(e) if !e.is_fatal() => {
                        error!(set = %set, error = %e, "Skipping garbage collection");
                        report.failed.push(set);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(report)
    }

    /// Preview every set of both tiers
    ///
    /// A set whose snapshots cannot be listed is logged and reported in
    /// [`GcOverview::failed`].
    pub fn preview_all(&self, config: &BackupConfig) -> BackupResult<GcOverview> {
        let mut overview = GcOverview::default();
        for tier in Tier::ALL {
            let retention = config.retention.for_tier(tier);
            for set in config.sets(tier) {
                match self.preview(&set, retention) {
                    Ok((stale, kept)) => overview.sets.push(GcPreview {
                        set,
                        tier,
                        retention,
                        stale,
                        kept,
                    }),
                    Err(e) if !e.is_fatal() => {
                        error!(set = %set, error = %e, "Skipping garbage collection preview");
                        overview.failed.push(set);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(overview)
    }
}
