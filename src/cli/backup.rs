//! Backup CLI commands
//!
//! Implements the daily run and snapshot garbage collection.

use crate::backup::{BackupManager, RetentionGc, RunReport};
use crate::config::BackupConfig;
use crate::display::{format_gc_preview, format_run_report};
use crate::error::BackupResult;
use crate::runner::FlexbackupRunner;
use crate::schedule::DateClock;
use crate::storage::FsSnapshotStore;

/// Run the day's backups and garbage collection
pub fn handle_run_command(
    config: &BackupConfig,
    clock: &dyn DateClock,
    dry_run: bool,
) -> BackupResult<RunReport> {
    let runner = FlexbackupRunner::new(config, dry_run)?;
    let store = FsSnapshotStore::new(&config.dest_directory);
    let manager = BackupManager::new(config, &runner, &store).with_dry_run(dry_run);

    let report = manager.run(clock)?;
    print!("{}", format_run_report(&report));
    Ok(report)
}

/// Show stale snapshots, deleting them only with `force`
pub fn handle_gc_command(config: &BackupConfig, force: bool) -> BackupResult<()> {
    let store = FsSnapshotStore::new(&config.dest_directory);
    let gc = RetentionGc::new(&store);

    let overview = gc.preview_all(config)?;
    for set in &overview.failed {
        println!("Skipping '{}': its snapshots could not be listed", set);
    }

    if overview.stale_count() == 0 {
        println!("No snapshots to prune.");
        println!(
            "Current retention policy: tier1 keeps {}, tier2 keeps {}",
            config.retention.tier1, config.retention.tier2
        );
        return Ok(());
    }

    println!("Prune Summary");
    println!("=============");
    print!("{}", format_gc_preview(&overview.sets));
    println!();

    if !force {
        println!("To delete stale snapshots, run again with --force flag:");
        println!("  flexbackup-manager gc --force");
        return Ok(());
    }

    let report = gc.collect_all(config)?;
    println!("Deleted {} snapshot(s).", report.removed_count());
    if !report.failed.is_empty() {
        println!("Could not list: {}", report.failed.join(", "));
    }

    Ok(())
}
