//! Backup manager for flexbackup-manager
//!
//! Runs one day's schedule: incremental backups, then full backups, then
//! garbage collection of stale snapshots across every configured set.
//! Sets are processed one at a time; each archiver run blocks until it exits.
//!
//! A dry run leaves the snapshot tree untouched: no dated directory is
//! created, `current` is not repointed and garbage collection only reports
//! what it would delete.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info};

use super::retention::{GcReport, RetentionGc};
use crate::config::BackupConfig;
use crate::error::BackupResult;
use crate::models::BackupLevel;
use crate::runner::BackupRunner;
use crate::schedule::{DailyPlan, DateClock, ScheduleSelector};
use crate::storage::SnapshotStore;

/// A backup set run that finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetRun {
    pub set: String,
    pub level: BackupLevel,
}

/// A backup set run that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetFailure {
    pub set: String,
    pub level: BackupLevel,
    pub reason: String,
}

/// Outcome of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The schedule that was executed
    pub plan: DailyPlan,
    /// Runs that completed
    pub completed: Vec<SetRun>,
    /// Incremental runs skipped for lack of a prior full backup
    pub skipped: Vec<String>,
    /// Runs the archiver reported as failed
    pub failed: Vec<SetFailure>,
    /// Garbage collection results
    pub gc: GcReport,
    /// Whether the snapshot tree was left untouched
    pub dry_run: bool,
}

impl RunReport {
    fn new(plan: DailyPlan, dry_run: bool) -> Self {
        Self {
            plan,
            dry_run,
            completed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            gc: GcReport::default(),
        }
    }

    /// Check whether every scheduled run succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.gc.failed.is_empty()
    }
}

/// Runs the daily schedule against a runner and a snapshot store
pub struct BackupManager<'a, R: BackupRunner, S: SnapshotStore> {
    config: &'a BackupConfig,
    selector: ScheduleSelector<'a>,
    runner: &'a R,
    store: &'a S,
    dry_run: bool,
}

impl<'a, R: BackupRunner, S: SnapshotStore> BackupManager<'a, R, S> {
    /// Create a new BackupManager
    pub fn new(config: &'a BackupConfig, runner: &'a R, store: &'a S) -> Self {
        Self {
            config,
            selector: ScheduleSelector::new(config),
            runner,
            store,
            dry_run: false,
        }
    }

    /// Leave the snapshot tree untouched
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Schedule of a given day
    pub fn plan_for(&self, date: NaiveDate) -> BackupResult<DailyPlan> {
        self.selector.plan_for(date)
    }

    /// Run today's schedule and garbage collection
    ///
    /// Archiver failures are logged and recorded in the report. A set whose
    /// full backup failed is left out of this invocation's garbage
    /// collection. Errors preparing a full backup's directory and snapshot
    /// removal failures abort the invocation.
    pub fn run(&self, clock: &dyn DateClock) -> BackupResult<RunReport> {
        let plan = self.selector.plan_today(clock)?;
        debug!(
            cycle_index = plan.cycle_index,
            cycle_len = plan.cycle_len,
            "Running cyclic backup"
        );
        log_summary(&plan);

        let mut report = RunReport::new(plan.clone(), self.dry_run);
        self.run_incremental(&plan, &mut report);
        self.run_full(&plan, &mut report)?;

        // Today's dated directory of a failed full backup is not a snapshot
        let held: Vec<String> = report
            .failed
            .iter()
            .filter(|f| f.level == BackupLevel::Full)
            .map(|f| f.set.clone())
            .collect();
        let gc = RetentionGc::new(self.store);
        report.gc = if self.dry_run {
            gc.simulate_all(self.config, &held)?
        } else {
            gc.collect_all_except(self.config, &held)?
        };

        Ok(report)
    }

    fn run_incremental(&self, plan: &DailyPlan, report: &mut RunReport) {
        for set in &plan.incremental {
            // Without a prior full backup there is nothing to increment from
            if !self.store.current_exists(set) {
                info!(
                    set = %set,
                    "Skip incremental backup: missing backup destination directory"
                );
                report.skipped.push(set.clone());
                continue;
            }
            self.run_set(set, BackupLevel::Incremental, report);
        }
    }

    fn run_full(&self, plan: &DailyPlan, report: &mut RunReport) -> BackupResult<()> {
        for set in &plan.full {
            if self.dry_run {
                info!(set = %set, date = %plan.date, "Dry run: not creating a dated directory");
            } else {
                let target = self.store.create_dated_dir(set, plan.date)?;
                self.store.set_current_pointer(set, &target)?;
            }
            self.run_set(set, BackupLevel::Full, report);
        }
        Ok(())
    }

    fn run_set(&self, set: &str, level: BackupLevel, report: &mut RunReport) {
        match self.runner.run(set, level) {
            Ok(()) => {
                info!(set, %level, "Backup finished");
                report.completed.push(SetRun {
                    set: set.to_string(),
                    level,
                });
            }
            Err(e) => {
                error!(set, %level, error = %e, "Backup failed");
                report.failed.push(SetFailure {
                    set: set.to_string(),
                    level,
                    reason: e.to_string(),
                });
            }
        }
    }
}

fn log_summary(plan: &DailyPlan) {
    info!("Incremental backup:\t{}", plan.incremental.join(", "));
    info!("Full backup:\t{}", plan.full.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::SAMPLE;
    use crate::error::BackupError;
    use crate::schedule::FixedClock;
    use crate::storage::FsSnapshotStore;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Runner that records calls and fails for selected sets
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<(String, BackupLevel)>>,
        failing: Vec<&'static str>,
    }

    impl BackupRunner for RecordingRunner {
        fn run(&self, set: &str, level: BackupLevel) -> BackupResult<()> {
            self.calls.borrow_mut().push((set.to_string(), level));
            if self.failing.iter().any(|f| *f == set) {
                return Err(BackupError::Runner {
                    set: set.to_string(),
                    reason: "exit status 2".into(),
                });
            }
            Ok(())
        }
    }

    fn create_test_config(temp: &TempDir) -> BackupConfig {
        let yaml = SAMPLE.replace(
            "\"/backup/nfs\"",
            &format!("\"{}\"", temp.path().display()),
        );
        BackupConfig::from_yaml_str(&yaml).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // cycle = [A,B],[C],[D],[A,B],[C]; 2000-01-04 is index 0
    const INDEX_ZERO: (i32, u32, u32) = (2000, 1, 4);

    #[cfg(unix)]
    #[test]
    fn test_full_backup_creates_dated_dir_and_current() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner::default();
        let manager = BackupManager::new(&config, &runner, &store);

        let (y, m, d) = INDEX_ZERO;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.plan.full, vec!["A", "B"]);
        for set in ["A", "B"] {
            assert!(store.set_dir(set).join("2000-01-04").is_dir());
            assert_eq!(
                store.current_target(set).unwrap(),
                store.set_dir(set).join("2000-01-04")
            );
        }

        let calls = runner.calls.borrow();
        assert!(calls.contains(&("A".to_string(), BackupLevel::Full)));
        assert!(calls.contains(&("B".to_string(), BackupLevel::Full)));
    }

    #[cfg(unix)]
    #[test]
    fn test_incremental_skipped_without_full_baseline() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner::default();
        let manager = BackupManager::new(&config, &runner, &store);

        // C has a baseline, D does not
        let c_dir = store.create_dated_dir("C", date(1999, 12, 30)).unwrap();
        store.set_current_pointer("C", &c_dir).unwrap();

        let (y, m, d) = INDEX_ZERO;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.plan.incremental, vec!["C", "D"]);
        assert_eq!(report.skipped, vec!["D"]);
        assert!(!store.set_dir("D").exists());

        let calls = runner.calls.borrow();
        // Incrementals run before fulls
        assert_eq!(calls[0], ("C".to_string(), BackupLevel::Incremental));
        assert!(!calls.iter().any(|(s, _)| s == "D"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_failure_does_not_stop_invocation() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner {
            failing: vec!["A"],
            ..Default::default()
        };
        let manager = BackupManager::new(&config, &runner, &store);

        let (y, m, d) = INDEX_ZERO;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].set, "A");
        assert!(report
            .completed
            .contains(&SetRun { set: "B".into(), level: BackupLevel::Full }));
        assert!(!report.all_succeeded());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_collects_garbage_for_all_sets() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner::default();
        let manager = BackupManager::new(&config, &runner, &store);

        // D is not scheduled for a full today but still gets pruned
        for d in ["1999-12-01", "1999-12-02"] {
            fs::create_dir_all(store.set_dir("D").join(d)).unwrap();
        }
        // A gets today's snapshot on top of two old ones
        for d in ["1999-12-01", "1999-12-02"] {
            fs::create_dir_all(store.set_dir("A").join(d)).unwrap();
        }

        let (y, m, d) = INDEX_ZERO;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert!(!store.set_dir("D").join("1999-12-01").exists());
        assert!(store.set_dir("D").join("1999-12-02").exists());
        assert!(!store.set_dir("A").join("1999-12-01").exists());
        assert!(store.set_dir("A").join("1999-12-02").exists());
        assert!(store.set_dir("A").join("2000-01-04").exists());
        assert_eq!(report.gc.removed_count(), 2);
    }

    #[test]
    fn test_plan_matches_selector() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner::default();
        let manager = BackupManager::new(&config, &runner, &store);

        let plan = manager.plan_for(date(2000, 1, 5)).unwrap();
        assert_eq!(plan.cycle_index, 1);
        assert_eq!(plan.full, vec!["C"]);
        assert!(runner.calls.borrow().is_empty());
    }

    // D's full turn
    const D_FULL_DAY: (i32, u32, u32) = (2000, 1, 6);

    fn seed_current(store: &FsSnapshotStore, set: &str, day: &str) -> std::path::PathBuf {
        let dir = store.set_dir(set).join(day);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("archive.tar.gz"), "data").unwrap();
        store.set_current_pointer(set, &dir).unwrap();
        dir
    }

    #[cfg(unix)]
    #[test]
    fn test_dry_run_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner::default();
        let manager = BackupManager::new(&config, &runner, &store).with_dry_run(true);

        let old = seed_current(&store, "D", "1999-12-01");
        for d in ["1999-12-01", "1999-12-02", "1999-12-03"] {
            fs::create_dir_all(store.set_dir("A").join(d)).unwrap();
        }

        let (y, m, d) = D_FULL_DAY;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.plan.full, vec!["D"]);
        assert!(report.dry_run);
        assert!(runner
            .calls
            .borrow()
            .contains(&("D".to_string(), BackupLevel::Full)));

        assert!(old.join("archive.tar.gz").exists());
        assert!(!store.set_dir("D").join("2000-01-06").exists());
        assert_eq!(store.current_target("D").unwrap(), old);

        // GC only reports
        assert_eq!(report.gc.removed, vec![store.set_dir("A").join("1999-12-01")]);
        assert!(store.set_dir("A").join("1999-12-01").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_full_backup_keeps_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner {
            failing: vec!["D"],
            ..Default::default()
        };
        let manager = BackupManager::new(&config, &runner, &store);

        let old = seed_current(&store, "D", "1999-12-01");

        let (y, m, d) = D_FULL_DAY;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.failed[0].set, "D");
        assert_eq!(report.gc.held, vec!["D"]);
        assert!(old.join("archive.tar.gz").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_incremental_does_not_hold_gc() {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp);
        let store = FsSnapshotStore::new(temp.path());
        let runner = RecordingRunner {
            failing: vec!["C"],
            ..Default::default()
        };
        let manager = BackupManager::new(&config, &runner, &store);

        seed_current(&store, "C", "1999-12-01");
        fs::create_dir_all(store.set_dir("C").join("1999-11-01")).unwrap();
        fs::create_dir_all(store.set_dir("C").join("1999-11-02")).unwrap();

        let (y, m, d) = INDEX_ZERO;
        let report = manager.run(&FixedClock(date(y, m, d))).unwrap();

        assert_eq!(report.failed[0].level, BackupLevel::Incremental);
        assert!(report.gc.held.is_empty());
        assert!(!store.set_dir("C").join("1999-11-01").exists());
    }
}
